use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use herald_core::AttachmentError;
use herald_directory::DirectoryError;
use herald_dispatch::ValidationError;
use herald_transport::TransportError;
use thiserror::Error;

/// Errors that can occur when running the Herald server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The recipient directory could not be loaded.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The messaging provider could not be set up or reached.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A dispatch request was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An attachment was rejected.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The referenced resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Directory(_) | Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Attachment(AttachmentError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Attachment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
