use std::time::Duration;

use herald_core::InvalidRecipientId;
use thiserror::Error;

/// Errors that can occur during transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The identifier matches no addressing shape; nothing was sent.
    #[error("invalid recipient id: {0}")]
    InvalidRecipientId(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {reason}")]
    Http {
        /// The HTTP status code.
        status: u16,
        /// Response body or status text.
        reason: String,
    },

    /// The provider rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// The provider did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A request or response could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// The HTTP status associated with this error, if the provider answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }
}

impl From<InvalidRecipientId> for TransportError {
    fn from(err: InvalidRecipientId) -> Self {
        Self::InvalidRecipientId(err.0)
    }
}
