//! Error types for the parse/convert engine.
//!
//! Errors are per chunk: a batch over many elements collects them next to
//! its results instead of stopping at the first one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BasisError {
    /// Symbol, name or atomic number missing from the element table.
    #[error("Unknown element: '{0}'")]
    UnknownElement(String),

    /// Required markers, headers or data rows are missing or inconsistent.
    #[error("Malformed block{}: {reason}", .element.as_ref().map(|e| format!(" for {e}")).unwrap_or_default())]
    MalformedBlock {
        element: Option<String>,
        reason: String,
    },

    /// The element named by the data is not the one that was asked for.
    #[error("Element mismatch: expected {expected}, found {found}")]
    ElementMismatch { expected: String, found: String },

    #[error("Unknown format: '{0}'. Run list-formats to see the known formats")]
    UnknownFormat(String),

    /// A format the catalog knows about, but which has no parser.
    #[error("No parser currently available for {0} data")]
    UnsupportedFormat(String),
}

impl BasisError {
    pub(crate) fn malformed(element: Option<&str>, reason: impl Into<String>) -> Self {
        BasisError::MalformedBlock {
            element: element.map(str::to_string),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BasisError>;
