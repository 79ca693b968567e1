use serde::{Deserialize, Serialize};

/// Acknowledgement returned by a transport for an accepted request.
///
/// Some provider modes answer with a body that cannot be read; the request
/// was still accepted, so `message_id` is simply `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Provider-assigned message identifier, when the response exposed one.
    pub message_id: Option<String>,
}

impl Ack {
    /// An acknowledgement carrying a provider message identifier.
    pub fn with_id(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
        }
    }

    /// An acknowledgement for an accepted request with an opaque body.
    pub fn opaque() -> Self {
        Self { message_id: None }
    }
}
