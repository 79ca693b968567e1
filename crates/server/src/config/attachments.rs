use herald_core::AttachmentLimits;
use herald_core::attachment::{DEFAULT_MAX_ATTACHMENT_BYTES, DEFAULT_MAX_ATTACHMENTS};
use serde::Deserialize;

/// Staged attachment limits.
#[derive(Debug, Deserialize)]
pub struct AttachmentConfig {
    /// Maximum number of staged attachments.
    #[serde(default = "default_max_count")]
    pub max_count: usize,
    /// Maximum size of a single attachment in bytes.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

impl From<&AttachmentConfig> for AttachmentLimits {
    fn from(config: &AttachmentConfig) -> Self {
        Self {
            max_count: config.max_count,
            max_size_bytes: config.max_size_bytes,
        }
    }
}

fn default_max_count() -> usize {
    DEFAULT_MAX_ATTACHMENTS
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_ATTACHMENT_BYTES
}
