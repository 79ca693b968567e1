use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while loading the recipient directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The source could not be fetched or did not have the expected shape.
    #[error("directory source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source did not answer within the configured timeout.
    #[error("directory source timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::SourceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::SourceUnavailable(format!("malformed table: {err}"))
    }
}
