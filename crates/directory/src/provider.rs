use async_trait::async_trait;
use herald_core::Recipient;

use crate::error::DirectoryError;

/// A source of recipients.
///
/// Implementations fetch once per call and never retry; the caller decides
/// whether and when to try again.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch the ordered, deduplicated recipient list.
    async fn fetch_recipients(&self) -> Result<Vec<Recipient>, DirectoryError>;
}
