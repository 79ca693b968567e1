use herald_core::{Ack, AddressingPolicy, Attachment, ChatId, RecipientId};
use tracing::info;

use crate::error::TransportError;
use crate::transport::Transport;

/// A transport that logs each send and returns success without performing
/// any external I/O.
///
/// Useful for local development and rehearsing a broadcast without
/// contacting real recipients.
pub struct LogTransport {
    name: String,
    policy: AddressingPolicy,
}

impl LogTransport {
    /// Create a new `LogTransport` with the given name and default addressing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: AddressingPolicy::default(),
        }
    }

    /// Use a custom addressing policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AddressingPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError> {
        Ok(self.policy.normalize(id)?)
    }

    #[allow(clippy::unused_async)]
    async fn send_text(&self, chat: &ChatId, body: &str) -> Result<Ack, TransportError> {
        info!(
            transport = %self.name,
            chat_id = %chat,
            chars = body.chars().count(),
            "log transport sent text"
        );
        Ok(Ack::opaque())
    }

    #[allow(clippy::unused_async)]
    async fn send_file(
        &self,
        chat: &ChatId,
        _caption: &str,
        file: &Attachment,
    ) -> Result<Ack, TransportError> {
        info!(
            transport = %self.name,
            chat_id = %chat,
            file_name = %file.file_name,
            file_ref = %file.file_ref,
            inline = file.content.is_some(),
            "log transport sent file"
        );
        Ok(Ack::opaque())
    }

    #[allow(clippy::unused_async)]
    async fn health_check(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
