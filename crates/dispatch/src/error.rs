use thiserror::Error;

/// Reasons a dispatch request is rejected before any state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message body is empty or whitespace.
    #[error("message body is empty")]
    EmptyMessage,

    /// No recipients were selected.
    #[error("no recipients selected")]
    NoRecipients,
}
