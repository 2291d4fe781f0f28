//! Split a raw per-basis-set dump into per-element chunks.
//!
//! The dumps arrive wrapped in whatever the retrieval layer returned (often
//! an HTML page), so every extractor works line by line and only looks at
//! its own format's markers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::element::{element_by_name, element_by_symbol};
use crate::entry::CoordinateConvention;
use crate::error::{BasisError, Result};

/// Kinds of data an NWChem dump can carry for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "ao basis")]
    AoBasis,
    #[serde(rename = "cd basis")]
    CdBasis,
    #[serde(rename = "xc basis")]
    XcBasis,
    #[serde(rename = "ecp")]
    Ecp,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::AoBasis => "ao basis",
            Section::CdBasis => "cd basis",
            Section::XcBasis => "xc basis",
            Section::Ecp => "ecp",
        }
    }

    /// Recognize a region opening line such as `BASIS "ao basis" PRINT` or `ECP`.
    fn from_marker_line(line: &str) -> Option<Section> {
        let lower = line.trim().to_lowercase();
        if lower.split_whitespace().next() == Some("ecp") {
            return Some(Section::Ecp);
        }
        let rest = lower.strip_prefix("basis")?.trim_start();
        [Section::AoBasis, Section::CdBasis, Section::XcBasis]
            .into_iter()
            .find(|s| rest.starts_with(&format!("\"{}\"", s.name())))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw data for one element of one basis set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub symbol: String,
    /// Convention stated once for the whole dump, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<CoordinateConvention>,
    pub sections: BTreeMap<Section, String>,
}

impl Chunk {
    /// A chunk holding only orbital basis text.
    pub fn new(symbol: impl Into<String>, text: impl Into<String>) -> Self {
        let mut sections = BTreeMap::new();
        sections.insert(Section::AoBasis, text.into());
        Self {
            symbol: symbol.into(),
            convention: None,
            sections,
        }
    }

    pub fn with_convention(mut self, convention: Option<CoordinateConvention>) -> Self {
        self.convention = convention;
        self
    }

    pub fn section(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    pub fn ao_basis(&self) -> Option<&str> {
        self.section(Section::AoBasis)
    }

    pub fn ecp(&self) -> Option<&str> {
        self.section(Section::Ecp)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub chunks: Vec<Chunk>,
    pub diagnostics: Diagnostics,
}

impl Extraction {
    fn report_leftovers(&mut self, basis_name: &str, requested: &[String]) {
        let mut leftover: Vec<String> = requested
            .iter()
            .filter(|e| !self.chunks.iter().any(|c| c.symbol.eq_ignore_ascii_case(e)))
            .cloned()
            .collect();
        if leftover.is_empty() {
            return;
        }
        leftover.sort();
        leftover.dedup();
        self.diagnostics.push(Diagnostic::LeftoverElements {
            basis: basis_name.to_string(),
            elements: leftover,
        });
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Join lines, dropping blank lines at either edge.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

/// Group lines into pieces, a new piece starting at every line for which
/// `starts_piece` holds. The starting line belongs to the new piece.
fn split_where<'a>(lines: &[&'a str], starts_piece: impl Fn(&str) -> bool) -> Vec<Vec<&'a str>> {
    let mut pieces: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if starts_piece(line) && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(line);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// First token of the first line that is not blank or a `#` comment.
fn leading_symbol(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .and_then(|l| l.split_whitespace().next())
        .map(str::to_string)
}

fn requested_symbols(elements: &[&str]) -> Vec<String> {
    elements.iter().map(|e| e.trim().to_string()).collect()
}

struct Region<'a> {
    section: Section,
    convention: Option<CoordinateConvention>,
    lines: Vec<&'a str>,
}

fn nwchem_regions(data: &str) -> Vec<Region<'_>> {
    let mut regions = Vec::new();
    let mut open: Option<Region> = None;
    for line in data.lines() {
        match open.as_mut() {
            None => {
                if let Some(section) = Section::from_marker_line(line) {
                    let convention = match section {
                        Section::Ecp => None,
                        _ => CoordinateConvention::find_in(line),
                    };
                    open = Some(Region {
                        section,
                        convention,
                        lines: Vec::new(),
                    });
                }
            }
            Some(region) => {
                if line.trim().eq_ignore_ascii_case("end") {
                    regions.extend(open.take());
                } else {
                    region.lines.push(line);
                }
            }
        }
    }
    if let Some(region) = open {
        tracing::debug!(section = %region.section, "unterminated NWChem region");
        regions.push(region);
    }
    regions
}

/// Extract NWChem chunks. Orbital and fitting regions split at `#BASIS SET`
/// comments, the ECP region at `<symbol> nelec <n>` lines; all sections of
/// one element end up in one chunk.
pub fn extract_nwchem(data: &str, basis_name: &str, elements: &[&str]) -> Result<Extraction> {
    let regions = nwchem_regions(data);
    if regions.is_empty() {
        return Err(BasisError::malformed(
            None,
            format!("no basis set data found in {basis_name}"),
        ));
    }

    let mut extraction = Extraction::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for region in &regions {
        let pieces = match region.section {
            Section::Ecp => split_where(&region.lines, |l| l.contains(" nelec ")),
            _ => split_where(&region.lines, |l| l.starts_with("#BASIS SET")),
        };
        for piece in pieces {
            let Some(token) = leading_symbol(&piece) else {
                continue;
            };
            let symbol = match element_by_symbol(&token) {
                Ok(element) => element.symbol,
                Err(err) => {
                    extraction.diagnostics.push(Diagnostic::from_error(basis_name, &err));
                    continue;
                }
            };
            let text = join_trimmed(&piece);
            match index.get(symbol) {
                Some(&i) => {
                    let chunk = &mut extraction.chunks[i];
                    chunk
                        .sections
                        .entry(region.section)
                        .and_modify(|existing| {
                            existing.push('\n');
                            existing.push_str(&text);
                        })
                        .or_insert(text);
                    if chunk.convention.is_none() {
                        chunk.convention = region.convention;
                    }
                }
                None => {
                    let mut sections = BTreeMap::new();
                    sections.insert(region.section, text);
                    index.insert(symbol.to_string(), extraction.chunks.len());
                    extraction.chunks.push(Chunk {
                        symbol: symbol.to_string(),
                        convention: region.convention,
                        sections,
                    });
                }
            }
        }
    }

    tracing::debug!(basis = basis_name, chunks = extraction.chunks.len(), "extracted NWChem dump");
    extraction.report_leftovers(basis_name, &requested_symbols(elements));
    Ok(extraction)
}

// Known defects in published GAMESS-US dumps.
const GAMESS_REPLACEMENTS: [(&str, &str); 6] = [
    ("PHOSPHOROUS", "PHOSPHORUS"),
    ("D+", "E+"),
    ("D-", "E-"),
    ("ELEMTN113", "UNUNTRIUM"),
    ("ELEMENT115", "UNUNPENTIUM"),
    ("ELEMENT117", "UNUNSEPTIUM"),
];

/// Extract GAMESS-US chunks from the `$DATA` ... `$END` payload. Chunks are
/// separated by blank lines and carry no symbol, so they pair positionally
/// with `elements`; the element name heading each chunk must agree. With
/// no requested elements, the heading names the chunk.
pub fn extract_gamess_us(data: &str, basis_name: &str, elements: &[&str]) -> Result<Extraction> {
    let data = GAMESS_REPLACEMENTS
        .iter()
        .fold(data.to_string(), |acc, (old, new)| acc.replace(old, new));

    let Some(begin) = data.find("$DATA") else {
        return Err(BasisError::malformed(None, format!("no $DATA section in {basis_name}")));
    };
    if data.contains("$DATA$END") {
        return Err(BasisError::malformed(None, format!("empty $DATA section in {basis_name}")));
    }
    let body_start = begin + "$DATA".len();
    let body_end = data[body_start..]
        .find("$END")
        .map_or(data.len(), |i| body_start + i);
    let lines: Vec<&str> = data[body_start..body_end].lines().collect();

    let pieces: Vec<String> = lines
        .split(|l| is_blank(l))
        .filter(|p| !p.is_empty())
        .map(join_trimmed)
        .collect();

    let requested = requested_symbols(elements);
    let mut extraction = Extraction::default();

    let pairs: Vec<(Option<&String>, String)> = if requested.is_empty() {
        pieces.into_iter().map(|p| (None, p)).collect()
    } else {
        requested.iter().map(Some).zip(pieces).collect()
    };

    for (expected, piece) in pairs {
        if piece.contains('$') {
            extraction.diagnostics.push(Diagnostic::MalformedBlock {
                basis: basis_name.to_string(),
                reason: "bad split, chunk contains '$'".to_string(),
            });
            continue;
        }
        let heading = piece.split_whitespace().next().unwrap_or_default();
        let found = element_by_name(heading);
        let symbol = match (expected, found) {
            (None, Ok(found)) => found.symbol,
            (Some(expected), Ok(found)) => match element_by_symbol(expected) {
                Ok(e) if e.number == found.number => e.symbol,
                Ok(e) => {
                    extraction.diagnostics.push(Diagnostic::ElementMismatch {
                        basis: basis_name.to_string(),
                        expected: e.name.to_string(),
                        found: heading.to_string(),
                    });
                    continue;
                }
                Err(err) => {
                    extraction.diagnostics.push(Diagnostic::from_error(basis_name, &err));
                    continue;
                }
            },
            (_, Err(err)) => {
                extraction.diagnostics.push(Diagnostic::from_error(basis_name, &err));
                continue;
            }
        };
        extraction.chunks.push(Chunk::new(symbol, piece));
    }

    tracing::debug!(basis = basis_name, chunks = extraction.chunks.len(), "extracted GAMESS-US dump");
    extraction.report_leftovers(basis_name, &requested);
    Ok(extraction)
}

fn is_star_marker(line: &str) -> bool {
    line.trim() == "****"
}

/// Extract Gaussian94 chunks delimited by `****` lines. A trailing chunk
/// with no closing marker is still captured.
pub fn extract_gaussian94(data: &str, basis_name: &str, elements: &[&str]) -> Result<Extraction> {
    let lines: Vec<&str> = data.lines().collect();
    let Some(first) = lines.iter().position(|l| is_star_marker(l)) else {
        return Err(BasisError::malformed(
            None,
            format!("no **** marker found in {basis_name}"),
        ));
    };
    let last = lines.iter().rposition(|l| is_star_marker(l)).unwrap_or(first);
    let region = if last > first {
        &lines[first + 1..last]
    } else {
        &lines[first + 1..]
    };

    let convention = lines[..first]
        .iter()
        .filter(|l| l.trim_start().starts_with('!'))
        .find_map(|l| CoordinateConvention::find_in(l));

    let requested = requested_symbols(elements);
    let mut unused: Vec<&String> = requested.iter().collect();
    let mut extraction = Extraction::default();

    for piece in region.split(|l| is_star_marker(l)) {
        let text = join_trimmed(piece);
        let Some(token) = text.split_whitespace().next() else {
            continue;
        };
        let symbol = match element_by_symbol(token) {
            Ok(element) => element.symbol,
            Err(err) => {
                extraction.diagnostics.push(Diagnostic::from_error(basis_name, &err));
                continue;
            }
        };
        match unused.iter().position(|e| e.eq_ignore_ascii_case(symbol)) {
            Some(i) => {
                unused.remove(i);
            }
            None if !requested.is_empty() => {
                extraction.diagnostics.push(Diagnostic::UnexpectedChunk {
                    basis: basis_name.to_string(),
                    symbol: symbol.to_string(),
                });
            }
            None => {}
        }
        extraction
            .chunks
            .push(Chunk::new(symbol, text).with_convention(convention));
    }

    tracing::debug!(basis = basis_name, chunks = extraction.chunks.len(), "extracted Gaussian94 dump");
    extraction.report_leftovers(basis_name, &requested);
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture(name: &str) -> String {
        let path = format!("{}/basis_files/{}", env!("CARGO_MANIFEST_DIR"), name);
        std::fs::read_to_string(path).unwrap()
    }

    const ELEMENTS: [&str; 3] = ["H", "He", "Cl"];

    #[test]
    fn nwchem_basic() {
        let helium = "#BASIS SET: (4s) -> [2s]
He    S
     38.4216340              0.0237660
      5.7780300              0.1546790
      1.2417740              0.4696300
He    S
      0.2979640              1.0000000";
        let extraction = extract_nwchem(&fixture("nwchem-6-31Gs.txt"), "6-31G*", &ELEMENTS).unwrap();
        assert_eq!(extraction.chunks.len(), 3);
        assert!(extraction.diagnostics.is_empty());
        let he = &extraction.chunks[1];
        assert_eq!(he.symbol, "He");
        assert_eq!(he.ao_basis(), Some(helium));
        assert_eq!(he.convention, Some(CoordinateConvention::Cartesian));
    }

    #[test]
    fn nwchem_ecp_mixed_and_only() {
        let extraction = extract_nwchem(&fixture("nwchem-lanl2dz-ecp.txt"), "LANL2DZ ECP", &["Li", "Na", "Cl", "Br"]).unwrap();
        let symbols: Vec<&str> = extraction.chunks.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Li", "Na", "Cl"]);

        let li = &extraction.chunks[0];
        assert!(li.ao_basis().unwrap().starts_with("#BASIS SET: (10s,4p) -> [3s,2p]\nLi    S"));
        assert_eq!(li.ecp(), None);

        let na = &extraction.chunks[1];
        assert!(na.ao_basis().is_some());
        assert!(na.ecp().unwrap().starts_with("Na nelec 10\nNa ul\n"));

        let cl = &extraction.chunks[2];
        assert_eq!(cl.ao_basis(), None);
        assert!(cl.ecp().unwrap().ends_with("3.1831000             15.3439560"));

        assert_eq!(
            extraction.diagnostics.into_vec(),
            vec![Diagnostic::LeftoverElements {
                basis: "LANL2DZ ECP".to_string(),
                elements: vec!["Br".to_string()],
            }]
        );
    }

    #[test]
    fn nwchem_cd_basis() {
        let extraction = extract_nwchem(&fixture("nwchem-ahlrichs-cd.txt"), "Ahlrichs Coulomb Fitting", &["He"]).unwrap();
        assert_eq!(extraction.chunks.len(), 1);
        let he = &extraction.chunks[0];
        assert_eq!(he.ao_basis(), None);
        let cd = he.section(Section::CdBasis).unwrap();
        assert!(cd.starts_with("#BASIS SET: (4s,2p) -> [2s,2p]\nHe    S\n"));
        assert!(cd.ends_with("1.50009035E+00         1.0000000"));
    }

    #[test]
    fn nwchem_single_element() {
        let extraction = extract_nwchem(&fixture("nwchem-B2_basis_set_for_Zn.txt"), "B2 basis set for Zn", &["Zn"]).unwrap();
        assert_eq!(extraction.chunks.len(), 1);
        assert_eq!(extraction.chunks[0].symbol, "Zn");
    }

    #[test]
    fn nwchem_without_regions() {
        let err = extract_nwchem("<html>nothing here</html>", "empty", &["H"]).unwrap_err();
        assert!(matches!(err, BasisError::MalformedBlock { .. }));
    }

    #[test]
    fn gamess_basic() {
        let helium = "HELIUM
S   3
  1     38.4216340              0.0237660
  2      5.7780300              0.1546790
  3      1.2417740              0.4696300
S   1
  1      0.2979640              1.0000000";
        let extraction = extract_gamess_us(&fixture("gamess-us-6-31Gs.txt"), "6-31G*", &ELEMENTS).unwrap();
        assert_eq!(extraction.chunks.len(), 3);
        assert_eq!(extraction.chunks[1].symbol, "He");
        assert_eq!(extraction.chunks[1].ao_basis(), Some(helium));
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn gamess_mismatch_is_discarded() {
        let extraction = extract_gamess_us(&fixture("gamess-us-6-31Gs.txt"), "6-31G*", &["H", "Li"]).unwrap();
        assert_eq!(extraction.chunks.len(), 1);
        let diagnostics = extraction.diagnostics.into_vec();
        assert_eq!(
            diagnostics[0],
            Diagnostic::ElementMismatch {
                basis: "6-31G*".to_string(),
                expected: "LITHIUM".to_string(),
                found: "HELIUM".to_string(),
            }
        );
        assert!(matches!(&diagnostics[1], Diagnostic::LeftoverElements { elements, .. } if elements == &vec!["Li".to_string()]));
    }

    #[test]
    fn gamess_replacements_and_missing_data() {
        let data = "$DATA\nPHOSPHOROUS\nS   1\n  1      0.1000000D+01              1.0000000\n$END";
        let extraction = extract_gamess_us(data, "x", &["P"]).unwrap();
        assert_eq!(
            extraction.chunks[0].ao_basis(),
            Some("PHOSPHORUS\nS   1\n  1      0.1000000E+01              1.0000000")
        );
        assert!(extract_gamess_us("<pre>no data</pre>", "x", &["P"]).is_err());
        assert!(extract_gamess_us("$DATA$END", "x", &["P"]).is_err());
    }

    #[test]
    fn gaussian94_basic() {
        let helium = "He     0
S   3   1.00
     38.4216340              0.0237660
      5.7780300              0.1546790
      1.2417740              0.4696300
S   1   1.00
      0.2979640              1.0000000";
        let extraction = extract_gaussian94(&fixture("gaussian94-6-31Gs.txt"), "6-31G*", &ELEMENTS).unwrap();
        assert_eq!(extraction.chunks.len(), 3);
        assert_eq!(extraction.chunks[1].symbol, "He");
        assert_eq!(extraction.chunks[1].ao_basis(), Some(helium));
        assert_eq!(extraction.chunks[1].convention, Some(CoordinateConvention::Cartesian));
    }

    #[test]
    fn gaussian94_single_unterminated_chunk() {
        let data = "! sto-3g\n****\nH     0\nS   3   1.00\n      3.4252509              0.1543290\n      0.6239137              0.5353281\n      0.1688554              0.4446345\n";
        let extraction = extract_gaussian94(data, "STO-3G", &["H"]).unwrap();
        assert_eq!(extraction.chunks.len(), 1);
        assert_eq!(extraction.chunks[0].symbol, "H");
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn gaussian94_unrequested_chunk_is_kept() {
        let extraction = extract_gaussian94(&fixture("gaussian94-6-31Gs.txt"), "6-31G*", &["H", "Cl", "Ar"]).unwrap();
        assert_eq!(extraction.chunks.len(), 3);
        let diagnostics = extraction.diagnostics.into_vec();
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::UnexpectedChunk {
                    basis: "6-31G*".to_string(),
                    symbol: "He".to_string(),
                },
                Diagnostic::LeftoverElements {
                    basis: "6-31G*".to_string(),
                    elements: vec!["Ar".to_string()],
                },
            ]
        );
    }

    #[test]
    fn chunk_store_layout() {
        let chunk = Chunk::new("He", "He    S");
        assert_eq!(
            serde_json::to_string(&chunk).unwrap(),
            r#"{"symbol":"He","sections":{"ao basis":"He    S"}}"#
        );
    }
}
