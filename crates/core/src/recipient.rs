use serde::{Deserialize, Serialize};

use crate::types::RecipientId;

/// A messaging group or contact loaded from the directory.
///
/// Recipients are created in bulk when the directory is loaded and replaced
/// wholesale on reload. A recipient without an identifier is kept so the
/// operator can see it, but it can never be selected or sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Human-readable name shown to the operator.
    pub display_name: String,
    /// Provider identifier, when the directory row had one.
    pub recipient_id: Option<RecipientId>,
}

impl Recipient {
    /// Create a recipient with an identifier. Blank identifiers become `None`.
    pub fn new(display_name: impl Into<String>, recipient_id: impl AsRef<str>) -> Self {
        Self {
            display_name: display_name.into(),
            recipient_id: RecipientId::new(recipient_id),
        }
    }

    /// Create a recipient that has no identifier.
    pub fn unaddressed(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            recipient_id: None,
        }
    }

    /// Whether this recipient can be sent to.
    pub fn is_addressable(&self) -> bool {
        self.recipient_id.is_some()
    }
}
