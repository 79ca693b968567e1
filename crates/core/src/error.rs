use thiserror::Error;

/// A recipient identifier that is blank or matches no known addressing shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid recipient id: {0:?}")]
pub struct InvalidRecipientId(pub String);

/// Errors raised when staging an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    /// Adding the file would exceed the configured attachment count.
    #[error("at most {max} attachments may be staged")]
    TooMany {
        /// The configured maximum.
        max: usize,
    },

    /// The file exceeds the configured per-file size.
    #[error("attachment {file_name:?} is {size_bytes} bytes, limit is {max_bytes}")]
    TooLarge {
        /// Name of the rejected file.
        file_name: String,
        /// Size of the rejected file.
        size_bytes: u64,
        /// The configured maximum.
        max_bytes: u64,
    },

    /// The file name is blank.
    #[error("attachment file name must not be empty")]
    MissingFileName,
}
