//! Error types for the local library.

use bsx_parse::BasisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocalError {
    #[error(transparent)]
    Basis(#[from] BasisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Basis set '{0}' not found")]
    BasisNotFound(String),

    #[error("Basis set '{0}' is already stored")]
    DuplicateBasis(String),

    /// The file parsed, but its tables do not hang together.
    #[error("Invalid store {path}: {reason}")]
    InvalidStore { path: String, reason: String },

    #[error("Giving up on {name} after {attempts} attempts: {message}")]
    RetriesExhausted {
        name: String,
        attempts: u32,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LocalError>;
