//! Error types for untable library.

use std::io;
use thiserror::Error;

/// Result type alias for untable operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during table extraction.
///
/// Structural irregularities in tables (bad spans, overlapping cells, ragged
/// rows) are never errors; they are absorbed and reported as
/// [`Diagnostic`](crate::model::Diagnostic)s instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input cannot be interpreted as a document at all.
    #[error("HTML parsing error: {0}")]
    Parse(String),

    /// Error encoding a table to its binary form.
    #[error("Encoding error: {0}")]
    Encode(String),

    /// Error decoding a table from its binary form.
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Error converting a table to or from JSON.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
