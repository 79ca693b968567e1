use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AttachmentError;

/// Default maximum number of staged attachments.
pub const DEFAULT_MAX_ATTACHMENTS: usize = 10;

/// Default maximum size of a single attachment (16 MiB).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 16 * 1024 * 1024;

/// A file staged for sending after the text message.
///
/// An attachment always carries a reference (`file_ref`, an absolute URL)
/// the provider can fetch. Uploaded files also keep their bytes in `content`
/// so transports can push them directly instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Stable identifier used to remove the attachment.
    pub id: Uuid,
    /// File name presented to recipients.
    pub file_name: String,
    /// URL the provider downloads the file from.
    pub file_ref: String,
    /// Size in bytes, when known.
    pub size_bytes: Option<u64>,
    /// MIME type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// File bytes, when the file was uploaded to this process.
    #[serde(skip)]
    pub content: Option<Bytes>,
}

impl Attachment {
    /// Create an attachment with a fresh identifier.
    pub fn new(file_name: impl Into<String>, file_ref: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            file_ref: file_ref.into(),
            size_bytes: None,
            content_type: None,
            content: None,
        }
    }

    /// Record the file size.
    #[must_use]
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Record the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Keep the file bytes alongside the reference.
    #[must_use]
    pub fn with_content(mut self, content: Bytes) -> Self {
        self.content = Some(content);
        self
    }
}

/// Count and size limits for staged attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentLimits {
    /// Maximum number of staged attachments.
    pub max_count: usize,
    /// Maximum size of a single attachment in bytes.
    pub max_size_bytes: u64,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_ATTACHMENTS,
            max_size_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

impl AttachmentLimits {
    /// Check a single file against the size limit.
    pub fn check_size(&self, file_name: &str, size_bytes: u64) -> Result<(), AttachmentError> {
        if size_bytes > self.max_size_bytes {
            return Err(AttachmentError::TooLarge {
                file_name: file_name.to_owned(),
                size_bytes,
                max_bytes: self.max_size_bytes,
            });
        }
        Ok(())
    }
}

/// Ordered list of staged attachments, bounded by [`AttachmentLimits`].
#[derive(Debug, Clone, Default)]
pub struct AttachmentList {
    items: Vec<Attachment>,
    limits: AttachmentLimits,
}

impl AttachmentList {
    /// Create an empty list with the given limits.
    pub fn new(limits: AttachmentLimits) -> Self {
        Self {
            items: Vec::new(),
            limits,
        }
    }

    /// The limits this list enforces.
    pub fn limits(&self) -> AttachmentLimits {
        self.limits
    }

    /// Append an attachment, enforcing the count and size limits.
    pub fn push(&mut self, attachment: Attachment) -> Result<(), AttachmentError> {
        if attachment.file_name.trim().is_empty() {
            return Err(AttachmentError::MissingFileName);
        }
        if self.items.len() >= self.limits.max_count {
            return Err(AttachmentError::TooMany {
                max: self.limits.max_count,
            });
        }
        if let Some(size) = attachment.size_bytes {
            self.limits.check_size(&attachment.file_name, size)?;
        }
        self.items.push(attachment);
        Ok(())
    }

    /// Remove the attachment with `id`, returning it if present.
    pub fn remove(&mut self, id: Uuid) -> Option<Attachment> {
        let pos = self.items.iter().position(|a| a.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Remove every attachment, returning what was staged.
    pub fn clear(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.items)
    }

    /// Number of staged attachments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in staging order.
    pub fn iter(&self) -> impl Iterator<Item = &Attachment> {
        self.items.iter()
    }

    /// Copy of the current list, taken when a run starts.
    pub fn snapshot(&self) -> Vec<Attachment> {
        self.items.clone()
    }
}
