pub mod addressing;
pub mod attachment;
pub mod error;
pub mod event;
pub mod outcome;
pub mod recipient;
pub mod selection;
pub mod types;

pub use addressing::AddressingPolicy;
pub use attachment::{Attachment, AttachmentLimits, AttachmentList};
pub use error::{AttachmentError, InvalidRecipientId};
pub use event::{DispatchEvent, DispatchSummary};
pub use outcome::Ack;
pub use recipient::Recipient;
pub use selection::SelectionSet;
pub use types::{ChatId, RecipientId};
