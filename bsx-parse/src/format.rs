use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classify::ParseHint;
use crate::diagnostics::Diagnostics;
use crate::entry::{BasisSetEntry, CoordinateConvention};
use crate::error::{BasisError, Result};
use crate::extract::{extract_gamess_us, extract_gaussian94, extract_nwchem, Extraction, Section};
use crate::parse_gamess_us::parse_gamess_us;
use crate::parse_gaussian94::parse_gaussian94;
use crate::parse_nwchem::parse_nwchem;
use crate::serialize::{
    serialize_gamess_us, serialize_gaussian94, serialize_nwchem, wrap_gamess_us, wrap_gaussian94,
    wrap_nwchem,
};
use crate::shell::ShellKind;
use crate::validate::{check_angular_momentum, AngularMomentumReport};
use crate::FORMAT_MAP;

/// The program formats with a parser and a serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "nwchem")]
    NwChem,
    #[serde(rename = "gamess-us")]
    GamessUs,
    #[serde(rename = "g94")]
    Gaussian94,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::NwChem, Format::GamessUs, Format::Gaussian94];

    pub fn tag(self) -> &'static str {
        match self {
            Format::NwChem => "nwchem",
            Format::GamessUs => "gamess-us",
            Format::Gaussian94 => "g94",
        }
    }

    pub fn program_name(self) -> &'static str {
        FORMAT_MAP.get(self.tag()).copied().unwrap_or_else(|| self.tag())
    }

    pub fn extract(self, data: &str, basis_name: &str, elements: &[&str]) -> Result<Extraction> {
        match self {
            Format::NwChem => extract_nwchem(data, basis_name, elements),
            Format::GamessUs => extract_gamess_us(data, basis_name, elements),
            Format::Gaussian94 => extract_gaussian94(data, basis_name, elements),
        }
    }

    /// Parse one element's orbital basis text.
    pub fn parse(self, text: &str, hint: &ParseHint) -> Result<(BasisSetEntry, Diagnostics)> {
        match self {
            Format::NwChem => parse_nwchem(text, hint),
            Format::GamessUs => parse_gamess_us(text, hint),
            Format::Gaussian94 => parse_gaussian94(text, hint),
        }
    }

    /// Highest shell the program accepts. `legacy` selects the older
    /// GAMESS-US limit.
    pub fn ceiling(self, legacy: bool) -> Option<ShellKind> {
        match self {
            Format::NwChem => Some(ShellKind::I),
            Format::GamessUs if legacy => Some(ShellKind::G),
            Format::GamessUs => Some(ShellKind::I),
            Format::Gaussian94 => None,
        }
    }

    pub fn validate(self, entries: &[BasisSetEntry], legacy: bool) -> AngularMomentumReport {
        check_angular_momentum(entries, self.ceiling(legacy), self == Format::GamessUs)
    }

    /// One element block. `origin` names where the data came from; only
    /// NWChem writes it out.
    pub fn serialize(self, entry: &BasisSetEntry, origin: &str) -> String {
        match self {
            Format::NwChem => serialize_nwchem(entry, origin),
            Format::GamessUs => serialize_gamess_us(entry),
            Format::Gaussian94 => serialize_gaussian94(entry),
        }
    }

    /// Wrap orbital basis blocks into a complete document.
    pub fn wrap<S: AsRef<str>>(self, blocks: &[S], convention: CoordinateConvention) -> String {
        match self {
            Format::NwChem => wrap_nwchem(
                blocks.iter().map(|b| (Section::AoBasis, b.as_ref())),
                convention,
            ),
            Format::GamessUs => wrap_gamess_us(blocks),
            Format::Gaussian94 => wrap_gaussian94(blocks, convention),
        }
    }

    /// Serialize and wrap `entries`. The document convention is the first
    /// entry's.
    pub fn render(self, entries: &[BasisSetEntry], origin: &str) -> String {
        let convention = entries
            .first()
            .map(BasisSetEntry::convention)
            .unwrap_or_default();
        let blocks: Vec<String> = entries.iter().map(|e| self.serialize(e, origin)).collect();
        self.wrap(&blocks, convention)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = BasisError;

    /// Accepts a tag or a program name, in any case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        if let Some(format) = Format::ALL
            .into_iter()
            .find(|f| f.tag() == wanted || f.program_name().to_lowercase() == wanted)
        {
            return Ok(format);
        }
        let known = FORMAT_MAP
            .entries()
            .any(|(tag, name)| *tag == wanted || name.to_lowercase() == wanted);
        if known {
            Err(BasisError::UnsupportedFormat(s.trim().to_string()))
        } else {
            Err(BasisError::UnknownFormat(s.trim().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::element_by_symbol;
    use crate::entry::ShellBlock;

    #[test]
    fn tags_and_names() {
        assert_eq!("nwchem".parse::<Format>(), Ok(Format::NwChem));
        assert_eq!("GAMESS-US".parse::<Format>(), Ok(Format::GamessUs));
        assert_eq!("Gaussian94".parse::<Format>(), Ok(Format::Gaussian94));
        assert_eq!(Format::GamessUs.program_name(), "GAMESS-US");
        assert_eq!(
            "turbomole".parse::<Format>(),
            Err(BasisError::UnsupportedFormat("turbomole".to_string()))
        );
        assert_eq!("xyz".parse::<Format>(), Err(BasisError::UnknownFormat("xyz".to_string())));
    }

    fn neon(kinds: &[ShellKind]) -> BasisSetEntry {
        let shells = kinds
            .iter()
            .map(|&k| ShellBlock::from_rows(k, &[vec![1.0, 1.0]]).unwrap())
            .collect();
        BasisSetEntry::new(element_by_symbol("Ne").unwrap(), CoordinateConvention::Spherical, 1.0, shells)
    }

    // cc-pV6Z reaches I shells, cc-pV8Z reaches L
    #[test]
    fn ceilings_per_format() {
        use ShellKind::*;
        let v6z = [neon(&[S, S, P, D, F, G, H, I])];
        let v8z = [neon(&[S, P, D, F, G, H, I, K, L])];
        for format in [Format::NwChem, Format::GamessUs] {
            let report = format.validate(&v6z, false);
            assert_eq!((report.max, report.too_large), (I, false));
            let report = format.validate(&v8z, false);
            assert_eq!((report.max, report.too_large), (L, true));
        }
        let report = Format::Gaussian94.validate(&v8z, false);
        assert_eq!((report.max, report.too_large), (L, false));
        assert!(Format::GamessUs.validate(&v6z, true).too_large);
    }

    #[test]
    fn serde_uses_tags() {
        assert_eq!(serde_json::to_string(&Format::Gaussian94).unwrap(), "\"g94\"");
    }
}
