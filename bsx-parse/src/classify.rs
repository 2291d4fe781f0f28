//! Line classification and the block-building state machine the three
//! format parsers share. Each parser only decides what kind of line it is
//! looking at; `BlockBuilder` owns the transitions and the checks.

use nom::character::complete::{space0, space1};
use nom::combinator::all_consuming;
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::delimited;
use nom::IResult;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::element::{element_by_name, element_by_symbol, Element};
use crate::entry::{BasisSetEntry, CoordinateConvention, ShellBlock};
use crate::error::{BasisError, Result};
use crate::extract::Chunk;
use crate::shell::ShellKind;

/// What one line of a chunk means.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    /// Blank or comment; ignored.
    Blank,
    /// End of the element's data.
    Terminator,
    Directive(CoordinateConvention),
    /// A symbol or element name naming the element on its own line.
    Identity(&'a str),
    Header(Header<'a>),
    Data(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header<'a> {
    /// Element symbol carried by the header itself (NWChem).
    pub symbol: Option<&'a str>,
    pub label: &'a str,
    /// Primitive count announced by the header (GAMESS-US, Gaussian94).
    pub count: Option<usize>,
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    InDirective,
    InHeader,
    InDataRows,
}

/// What a parser knows about a chunk before reading it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseHint {
    pub expected: Option<String>,
    /// Convention stated at document level.
    pub convention: Option<CoordinateConvention>,
    /// Wins over anything found in the text.
    pub convention_override: Option<CoordinateConvention>,
}

impl ParseHint {
    pub fn expecting(symbol: impl Into<String>) -> Self {
        Self {
            expected: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn for_chunk(chunk: &Chunk) -> Self {
        Self {
            expected: Some(chunk.symbol.clone()),
            convention: chunk.convention,
            convention_override: None,
        }
    }

    pub fn with_override(mut self, convention: Option<CoordinateConvention>) -> Self {
        self.convention_override = convention;
        self
    }
}

fn number_list(input: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(delimited(space0, separated_list1(space1, double), space0))(input)
}

/// Parse one number, accepting Fortran `D` exponents.
pub fn fortran_double(token: &str) -> Option<f64> {
    let normalized = token.trim().replace(['D', 'd'], "E");
    all_consuming(double::<&str, nom::error::Error<&str>>)(normalized.as_str())
        .ok()
        .map(|(_, value)| value)
}

/// Parse a whole line of numbers, or `None` if it is anything else.
pub fn data_row(line: &str) -> Option<Vec<f64>> {
    let first = line.trim_start().chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    let normalized = line.replace(['D', 'd'], "E");
    number_list(&normalized).ok().map(|(_, values)| values)
}

struct OpenBlock {
    kind: ShellKind,
    label: String,
    declared: Option<usize>,
    rows: Vec<Vec<f64>>,
}

/// Accumulates shell blocks for one element while tracking the parser state.
pub(crate) struct BlockBuilder<'h> {
    hint: &'h ParseHint,
    /// GAMESS-US spells SP and L the same: an "L" block with two
    /// coefficient columns is SP, with one it is an L shell.
    gamess_labels: bool,
    state: ParserState,
    identity: Option<Element>,
    convention: Option<CoordinateConvention>,
    scale_factor: Option<f64>,
    open: Option<OpenBlock>,
    shells: Vec<ShellBlock>,
    diagnostics: Diagnostics,
}

impl<'h> BlockBuilder<'h> {
    pub(crate) fn new(hint: &'h ParseHint) -> Self {
        Self {
            hint,
            gamess_labels: false,
            state: ParserState::Idle,
            identity: None,
            convention: None,
            scale_factor: None,
            open: None,
            shells: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub(crate) fn gamess_labels(mut self) -> Self {
        self.gamess_labels = true;
        self
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ParserState {
        self.state
    }

    fn element_label(&self) -> Option<String> {
        self.identity
            .map(|e| e.symbol.to_string())
            .or_else(|| self.hint.expected.clone())
    }

    fn malformed(&self, reason: impl Into<String>) -> BasisError {
        BasisError::MalformedBlock {
            element: self.element_label(),
            reason: reason.into(),
        }
    }

    /// Resolve a symbol or element name and check it against what we
    /// expect and what earlier lines said.
    fn identify(&mut self, token: &str) -> Result<()> {
        let element = element_by_symbol(token).or_else(|_| element_by_name(token))?;
        if let Some(known) = self.identity {
            if known != element {
                return Err(BasisError::ElementMismatch {
                    expected: known.symbol.to_string(),
                    found: element.symbol.to_string(),
                });
            }
            return Ok(());
        }
        if let Some(expected) = &self.hint.expected {
            let expected = element_by_symbol(expected)?;
            if expected != element {
                return Err(BasisError::ElementMismatch {
                    expected: expected.symbol.to_string(),
                    found: element.symbol.to_string(),
                });
            }
        }
        self.identity = Some(element);
        Ok(())
    }

    fn resolve_kind(&self, label: &str) -> Result<ShellKind> {
        if self.gamess_labels && label.eq_ignore_ascii_case("L") {
            return Ok(ShellKind::SP);
        }
        ShellKind::from_label(label).ok_or_else(|| self.malformed(format!("unknown shell label '{label}'")))
    }

    fn close_block(&mut self) -> Result<()> {
        let Some(block) = self.open.take() else {
            return Ok(());
        };
        if let Some(declared) = block.declared {
            if declared != block.rows.len() {
                return Err(self.malformed(format!(
                    "shell {} declares {declared} primitives, found {}",
                    block.label,
                    block.rows.len()
                )));
            }
        }
        let single_column = block.rows.first().is_some_and(|row| row.len() == 2);
        let kind = if self.gamess_labels && block.label == "L" && single_column {
            ShellKind::L
        } else {
            block.kind
        };
        let shell = ShellBlock::from_rows(kind, &block.rows).map_err(|err| match err {
            BasisError::MalformedBlock { reason, .. } => self.malformed(reason),
            other => other,
        })?;
        self.shells.push(shell);
        Ok(())
    }

    /// Feed one classified line. Returns `false` once the terminator is seen.
    pub(crate) fn feed(&mut self, line: Line<'_>) -> Result<bool> {
        match line {
            Line::Blank => {}
            Line::Terminator => return Ok(false),
            Line::Directive(convention) => {
                if self.state == ParserState::InHeader {
                    return Err(self.malformed("directive between header and data rows"));
                }
                self.close_block()?;
                self.convention = Some(convention);
                self.state = ParserState::InDirective;
            }
            Line::Identity(token) => {
                if self.state == ParserState::InHeader {
                    let label = self.open.as_ref().map(|b| b.label.clone()).unwrap_or_default();
                    return Err(self.malformed(format!("no data rows after header '{label}'")));
                }
                self.close_block()?;
                self.identify(token)?;
                self.state = ParserState::Idle;
            }
            Line::Header(header) => {
                if self.state == ParserState::InHeader {
                    let label = self.open.as_ref().map(|b| b.label.clone()).unwrap_or_default();
                    return Err(self.malformed(format!("no data rows after header '{label}'")));
                }
                self.close_block()?;
                if let Some(symbol) = header.symbol {
                    self.identify(symbol)?;
                }
                let kind = self.resolve_kind(header.label)?;
                if let Some(scale) = header.scale {
                    match self.scale_factor {
                        None => self.scale_factor = Some(scale),
                        Some(kept) if kept != scale => {
                            let symbol = self.element_label().unwrap_or_default();
                            self.diagnostics.push(Diagnostic::ScaleFactorMismatch {
                                symbol,
                                kept,
                                found: scale,
                            });
                        }
                        Some(_) => {}
                    }
                }
                self.open = Some(OpenBlock {
                    kind,
                    label: header.label.to_uppercase(),
                    declared: header.count,
                    rows: Vec::new(),
                });
                self.state = ParserState::InHeader;
            }
            Line::Data(values) => match self.open.as_mut() {
                Some(block) => {
                    block.rows.push(values);
                    self.state = ParserState::InDataRows;
                }
                None => return Err(self.malformed("data row before any shell header")),
            },
        }
        Ok(true)
    }

    pub(crate) fn finish(mut self) -> Result<(BasisSetEntry, Diagnostics)> {
        if self.state == ParserState::InHeader {
            let label = self.open.as_ref().map(|b| b.label.clone()).unwrap_or_default();
            return Err(self.malformed(format!("no data rows after header '{label}'")));
        }
        self.close_block()?;
        let element = match (self.identity, &self.hint.expected) {
            (Some(element), _) => element,
            (None, Some(expected)) => element_by_symbol(expected)?,
            (None, None) => return Err(self.malformed("no element named in chunk")),
        };
        if self.shells.is_empty() {
            return Err(self.malformed("no shells found"));
        }
        let convention = self
            .hint
            .convention_override
            .or(self.convention)
            .or(self.hint.convention)
            .unwrap_or_default();
        let entry = BasisSetEntry::new(
            element,
            convention,
            self.scale_factor.unwrap_or(1.0),
            self.shells,
        );
        Ok((entry, self.diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(label: &str) -> Line<'_> {
        Line::Header(Header {
            symbol: None,
            label,
            count: None,
            scale: None,
        })
    }

    #[test]
    fn numbers() {
        assert_eq!(fortran_double("0.4137D-06"), Some(0.4137e-06));
        assert_eq!(fortran_double("1.00"), Some(1.0));
        assert_eq!(fortran_double("S"), None);
        assert_eq!(fortran_double("1.5d0"), Some(1.5));
        assert_eq!(fortran_double("2.0E+00x"), None);
        assert_eq!(
            data_row("      0.4446000             -0.2223110   "),
            Some(vec![0.4446, -0.222311])
        );
        assert_eq!(data_row("  1     38.4216340   0.0237660"), Some(vec![1.0, 38.421634, 0.023766]));
        assert_eq!(data_row("He    S"), None);
        assert_eq!(data_row("1.0 x"), None);
    }

    #[test]
    fn state_transitions() {
        let hint = ParseHint::expecting("H");
        let mut builder = BlockBuilder::new(&hint);
        assert_eq!(builder.state(), ParserState::Idle);
        builder.feed(Line::Directive(CoordinateConvention::Cartesian)).unwrap();
        assert_eq!(builder.state(), ParserState::InDirective);
        builder.feed(header("S")).unwrap();
        assert_eq!(builder.state(), ParserState::InHeader);
        builder.feed(Line::Data(vec![3.4, 0.15])).unwrap();
        assert_eq!(builder.state(), ParserState::InDataRows);
        assert!(!builder.feed(Line::Terminator).unwrap());
        let (entry, diagnostics) = builder.finish().unwrap();
        assert_eq!(entry.symbol(), "H");
        assert_eq!(entry.convention(), CoordinateConvention::Cartesian);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn header_without_rows() {
        let hint = ParseHint::expecting("H");
        let mut builder = BlockBuilder::new(&hint);
        builder.feed(header("S")).unwrap();
        let err = builder.feed(header("P")).unwrap_err();
        assert_eq!(
            err,
            BasisError::MalformedBlock {
                element: Some("H".to_string()),
                reason: "no data rows after header 'S'".to_string(),
            }
        );

        let mut builder = BlockBuilder::new(&hint);
        builder.feed(header("S")).unwrap();
        assert!(builder.finish().is_err());
    }

    #[test]
    fn data_before_header() {
        let hint = ParseHint::default();
        let mut builder = BlockBuilder::new(&hint);
        assert!(builder.feed(Line::Data(vec![1.0, 1.0])).is_err());
    }

    #[test]
    fn identity_must_match_expected() {
        let hint = ParseHint::expecting("He");
        let mut builder = BlockBuilder::new(&hint);
        assert_eq!(
            builder.feed(Line::Identity("LITHIUM")),
            Err(BasisError::ElementMismatch {
                expected: "He".to_string(),
                found: "Li".to_string(),
            })
        );
    }

    #[test]
    fn gamess_l_is_sp_on_either_side_of_d() {
        let hint = ParseHint::expecting("Cl");
        let mut builder = BlockBuilder::new(&hint).gamess_labels();
        for line in [
            header("L"),
            Line::Data(vec![1.0, 0.5, 0.5]),
            header("D"),
            Line::Data(vec![0.75, 1.0]),
            header("L"),
            Line::Data(vec![0.3, 0.4, 0.6]),
            header("L"),
            Line::Data(vec![0.1, 1.0]),
        ] {
            builder.feed(line).unwrap();
        }
        let (entry, _) = builder.finish().unwrap();
        let kinds: Vec<ShellKind> = entry.shells().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![ShellKind::SP, ShellKind::D, ShellKind::SP, ShellKind::L]);
    }

    #[test]
    fn convention_precedence() {
        let hint = ParseHint {
            expected: Some("H".to_string()),
            convention: Some(CoordinateConvention::Cartesian),
            convention_override: None,
        };
        let mut builder = BlockBuilder::new(&hint);
        builder.feed(header("S")).unwrap();
        builder.feed(Line::Data(vec![1.0, 1.0])).unwrap();
        let (entry, _) = builder.finish().unwrap();
        assert_eq!(entry.convention(), CoordinateConvention::Cartesian);

        let hint = hint.with_override(Some(CoordinateConvention::Spherical));
        let mut builder = BlockBuilder::new(&hint);
        builder.feed(Line::Directive(CoordinateConvention::Cartesian)).unwrap();
        builder.feed(header("S")).unwrap();
        builder.feed(Line::Data(vec![1.0, 1.0])).unwrap();
        let (entry, _) = builder.finish().unwrap();
        assert_eq!(entry.convention(), CoordinateConvention::Spherical);
    }
}
