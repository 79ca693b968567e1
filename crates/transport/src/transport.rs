use async_trait::async_trait;
use herald_core::{Ack, Attachment, ChatId, RecipientId};

use crate::error::TransportError;

/// Strongly-typed transport trait with native `async fn`.
///
/// A transport wraps a messaging provider's remote operations. Calls are
/// single attempts: implementations never retry on their own.
///
/// This trait is **not** object-safe because it uses native `async fn` methods.
/// If you need dynamic dispatch, use [`DynTransport`] instead -- every
/// `Transport` automatically implements `DynTransport` via a blanket
/// implementation.
pub trait Transport: Send + Sync {
    /// Returns the unique name of this transport.
    fn name(&self) -> &str;

    /// Turn a directory identifier into the provider's address format.
    ///
    /// Must not perform I/O. An identifier that fails here never reaches the
    /// network.
    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError>;

    /// Send a text message.
    fn send_text(
        &self,
        chat: &ChatId,
        body: &str,
    ) -> impl std::future::Future<Output = Result<Ack, TransportError>> + Send;

    /// Send a staged file.
    ///
    /// Implementations may push `file.content` directly when it is present,
    /// otherwise the provider downloads `file.file_ref`.
    fn send_file(
        &self,
        chat: &ChatId,
        caption: &str,
        file: &Attachment,
    ) -> impl std::future::Future<Output = Result<Ack, TransportError>> + Send;

    /// Verify the provider account is usable.
    fn health_check(&self) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;
}

/// Object-safe transport trait for use behind `Arc<dyn DynTransport>`.
///
/// You generally should not implement this trait directly -- instead implement
/// [`Transport`] and rely on the blanket implementation.
#[async_trait]
pub trait DynTransport: Send + Sync {
    /// Returns the unique name of this transport.
    fn name(&self) -> &str;

    /// Turn a directory identifier into the provider's address format.
    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError>;

    /// Send a text message.
    async fn send_text(&self, chat: &ChatId, body: &str) -> Result<Ack, TransportError>;

    /// Send a staged file.
    async fn send_file(
        &self,
        chat: &ChatId,
        caption: &str,
        file: &Attachment,
    ) -> Result<Ack, TransportError>;

    /// Verify the provider account is usable.
    async fn health_check(&self) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: Transport + Sync> DynTransport for T {
    fn name(&self) -> &str {
        Transport::name(self)
    }

    fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError> {
        Transport::normalize_recipient(self, id)
    }

    async fn send_text(&self, chat: &ChatId, body: &str) -> Result<Ack, TransportError> {
        Transport::send_text(self, chat, body).await
    }

    async fn send_file(
        &self,
        chat: &ChatId,
        caption: &str,
        file: &Attachment,
    ) -> Result<Ack, TransportError> {
        Transport::send_file(self, chat, caption, file).await
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        Transport::health_check(self).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use herald_core::AddressingPolicy;

    use super::*;

    struct MockTransport {
        should_fail: bool,
        policy: AddressingPolicy,
    }

    impl MockTransport {
        fn new(should_fail: bool) -> Self {
            Self {
                should_fail,
                policy: AddressingPolicy::default(),
            }
        }
    }

    impl Transport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        fn normalize_recipient(&self, id: &RecipientId) -> Result<ChatId, TransportError> {
            Ok(self.policy.normalize(id)?)
        }

        async fn send_text(&self, _chat: &ChatId, _body: &str) -> Result<Ack, TransportError> {
            if self.should_fail {
                return Err(TransportError::Http {
                    status: 500,
                    reason: "mock failure".into(),
                });
            }
            Ok(Ack::with_id("m-1"))
        }

        async fn send_file(
            &self,
            _chat: &ChatId,
            _caption: &str,
            _file: &Attachment,
        ) -> Result<Ack, TransportError> {
            Ok(Ack::opaque())
        }

        async fn health_check(&self) -> Result<(), TransportError> {
            if self.should_fail {
                return Err(TransportError::Connection("mock unhealthy".into()));
            }
            Ok(())
        }
    }

    fn group() -> RecipientId {
        RecipientId::new("120363000000000001").unwrap()
    }

    #[tokio::test]
    async fn transport_send_text_success() {
        let transport = MockTransport::new(false);
        let chat = Transport::normalize_recipient(&transport, &group()).unwrap();
        let ack = Transport::send_text(&transport, &chat, "hi").await.unwrap();
        assert_eq!(ack.message_id.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn transport_send_text_failure() {
        let transport = MockTransport::new(true);
        let chat = Transport::normalize_recipient(&transport, &group()).unwrap();
        let err = Transport::send_text(&transport, &chat, "hi")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn blanket_dyn_transport_impl() {
        let transport: Arc<dyn DynTransport> = Arc::new(MockTransport::new(false));
        assert_eq!(transport.name(), "mock");

        let chat = transport.normalize_recipient(&group()).unwrap();
        assert_eq!(chat.as_str(), "120363000000000001@g.us");

        let file = Attachment::new("a", "https://x/a");
        let ack = transport.send_file(&chat, "", &file).await.unwrap();
        assert!(ack.message_id.is_none());
        transport.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn dyn_transport_rejects_bad_identifier() {
        let transport: Arc<dyn DynTransport> = Arc::new(MockTransport::new(false));
        let err = transport
            .normalize_recipient(&RecipientId::new("not-an-id").unwrap())
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRecipientId(_)));
    }
}
