//! Non-fatal findings collected while extracting, parsing and converting.

use std::fmt;

use crate::error::BasisError;
use crate::extract::Section;
use crate::shell::ShellKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Requested elements with no chunk in the dump.
    LeftoverElements {
        basis: String,
        elements: Vec<String>,
    },
    /// A chunk for an element nobody asked for.
    UnexpectedChunk { basis: String, symbol: String },
    ElementMismatch {
        basis: String,
        expected: String,
        found: String,
    },
    /// A chunk thrown away during extraction.
    MalformedBlock { basis: String, reason: String },
    ScaleFactorMismatch {
        symbol: String,
        kept: f64,
        found: f64,
    },
    AngularMomentumExceeded {
        max: ShellKind,
        ceiling: ShellKind,
        format: String,
    },
    /// ECP data the target format cannot carry.
    EcpDropped { symbol: String, format: String },
    /// Auxiliary fitting functions the target format cannot carry.
    FittingDropped {
        symbol: String,
        section: Section,
        format: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::LeftoverElements { basis, elements } => {
                write!(f, "{basis}: no data for {}", elements.join(", "))
            }
            Diagnostic::UnexpectedChunk { basis, symbol } => {
                write!(f, "{basis}: unrequested chunk for '{symbol}'")
            }
            Diagnostic::ElementMismatch {
                basis,
                expected,
                found,
            } => write!(f, "{basis}: expected {expected}, found {found}"),
            Diagnostic::MalformedBlock { basis, reason } => write!(f, "{basis}: {reason}"),
            Diagnostic::ScaleFactorMismatch { symbol, kept, found } => {
                write!(f, "{symbol}: scale factor {found} ignored, keeping {kept}")
            }
            Diagnostic::AngularMomentumExceeded {
                max,
                ceiling,
                format,
            } => write!(f, "{format} supports shells up to {ceiling}, data goes up to {max}"),
            Diagnostic::EcpDropped { symbol, format } => {
                write!(f, "{symbol}: ECP data not written to {format}")
            }
            Diagnostic::FittingDropped {
                symbol,
                section,
                format,
            } => write!(f, "{symbol}: {} not written to {format}", section.name()),
        }
    }
}

impl Diagnostic {
    /// The extraction-time form of a chunk-level error.
    pub fn from_error(basis: &str, err: &BasisError) -> Self {
        match err {
            BasisError::ElementMismatch { expected, found } => Diagnostic::ElementMismatch {
                basis: basis.to_string(),
                expected: expected.clone(),
                found: found.clone(),
            },
            other => Diagnostic::MalformedBlock {
                basis: basis.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Ordered warnings sink. Every push is also emitted as a `tracing` warning,
/// so callers that only watch the log still see them on stderr.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "basis diagnostic");
        self.0.push(diagnostic);
    }

    /// Append already-reported diagnostics without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::UnexpectedChunk {
            basis: "6-31G".to_string(),
            symbol: "Li".to_string(),
        });
        diagnostics.push(Diagnostic::LeftoverElements {
            basis: "6-31G".to_string(),
            elements: vec!["H".to_string(), "He".to_string()],
        });
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(diagnostics.iter().next(), Some(Diagnostic::UnexpectedChunk { .. })));
        assert_eq!(
            diagnostics.iter().nth(1).unwrap().to_string(),
            "6-31G: no data for H, He"
        );
    }

    #[test]
    fn errors_become_extraction_diagnostics() {
        let err = BasisError::ElementMismatch {
            expected: "He".to_string(),
            found: "Li".to_string(),
        };
        assert_eq!(
            Diagnostic::from_error("sto-3g", &err),
            Diagnostic::ElementMismatch {
                basis: "sto-3g".to_string(),
                expected: "He".to_string(),
                found: "Li".to_string(),
            }
        );
    }

    #[test]
    fn fitting_sections_are_named() {
        let dropped = Diagnostic::FittingDropped {
            symbol: "He".to_string(),
            section: Section::CdBasis,
            format: "GAMESS-US".to_string(),
        };
        assert_eq!(dropped.to_string(), "He: cd basis not written to GAMESS-US");
    }
}
