//! Error types shared across the scoring pipeline.
//!
//! Three kinds cover the failure surface: malformed input data, bad
//! per-request input, and a missing or unreadable model artifact.

use thiserror::Error;

/// Errors surfaced by the loading, transform, and serving layers.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Input file is malformed or missing required fields. Reported to the
    /// caller, never retried.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// A single record failed validation (missing field, non-finite value).
    /// Maps to a client error at the API boundary.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The model artifact is missing or corrupt. Fatal at startup.
    #[error("model artifact unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ScoreError {
    /// HTTP status code equivalent for this error kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ScoreError::DataFormat(_) | ScoreError::Validation(_) => 422,
            ScoreError::ServiceUnavailable(_) => 503,
        }
    }
}
