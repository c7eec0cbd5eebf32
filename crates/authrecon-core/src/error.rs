//! Error types for AuthRecon.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl Error {
    /// Caller errors are reported as client errors rather than server faults.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::UnknownType(_) | Error::MalformedBatch(_) | Error::MalformedQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
