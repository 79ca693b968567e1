use std::time::Duration;

use herald_transport::TransportError;
use thiserror::Error;

/// Errors specific to the Green-API transport.
///
/// These are internal errors that get converted into [`TransportError`] at
/// the public API boundary.
#[derive(Debug, Error)]
pub enum GreenApiError {
    /// An HTTP-level transport error occurred. The request URL is stripped
    /// because it embeds the API token.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// No complete response arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Green-API answered with a non-success status.
    #[error("Green-API error: HTTP {status}: {body}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The response body, if readable.
        body: String,
    },

    /// The instance exists but cannot send (e.g. not logged in).
    #[error("instance not authorized: state is {0:?}")]
    NotAuthorized(String),

    /// The provider received an HTTP 429 (Too Many Requests) response.
    #[error("rate limited by Green-API")]
    RateLimited,
}

impl From<GreenApiError> for TransportError {
    fn from(err: GreenApiError) -> Self {
        match err {
            GreenApiError::Http(e) => TransportError::Connection(e.to_string()),
            GreenApiError::Timeout(after) => TransportError::Timeout(after),
            GreenApiError::Api { status, body } => TransportError::Http {
                status,
                reason: body,
            },
            GreenApiError::NotAuthorized(state) => {
                TransportError::Configuration(format!("instance state is {state:?}"))
            }
            GreenApiError::RateLimited => TransportError::RateLimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_rate_limited() {
        let err: TransportError = GreenApiError::RateLimited.into();
        assert!(matches!(err, TransportError::RateLimited));
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn api_error_keeps_status() {
        let err: TransportError = GreenApiError::Api {
            status: 466,
            body: "quota exceeded".into(),
        }
        .into();
        assert_eq!(err.status(), Some(466));
        assert_eq!(err.to_string(), "HTTP 466: quota exceeded");
    }

    #[test]
    fn timeout_maps_to_timeout() {
        let err: TransportError = GreenApiError::Timeout(Duration::from_secs(30)).into();
        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_secs(30)));
    }

    #[test]
    fn not_authorized_maps_to_configuration() {
        let err: TransportError = GreenApiError::NotAuthorized("notAuthorized".into()).into();
        assert!(matches!(err, TransportError::Configuration(_)));
    }
}
