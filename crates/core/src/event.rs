use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RecipientId;

/// Final tally of a dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Recipients whose text message was accepted.
    pub sent: usize,
    /// Recipients whose text message failed.
    pub errors: usize,
    /// Attachment sends that failed (counted separately from `errors`).
    pub attachment_errors: usize,
    /// Recipients skipped for a missing or unusable identifier.
    pub skipped: usize,
    /// Number of recipients the run was started with.
    pub total: usize,
    /// Whether the run ended because a stop was requested.
    pub stopped: bool,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl DispatchSummary {
    /// Recipients that were examined before the run ended.
    pub fn processed(&self) -> usize {
        self.sent + self.errors + self.skipped
    }
}

/// A progress notification emitted by the dispatch controller.
///
/// Events for one run are emitted strictly in recipient order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A run has started.
    Started {
        /// Number of recipients in the run.
        total: usize,
    },
    /// A recipient's text message was accepted.
    Progress {
        /// Recipients sent so far.
        sent: usize,
        /// Number of recipients in the run.
        total: usize,
    },
    /// A recipient's text message failed.
    RecipientFailed {
        /// Name of the recipient.
        display_name: String,
        /// Identifier of the recipient.
        recipient_id: RecipientId,
        /// HTTP status, when the provider answered.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        /// Human-readable reason.
        reason: String,
    },
    /// An attachment send failed.
    AttachmentFailed {
        /// Name of the recipient.
        display_name: String,
        /// Identifier of the recipient.
        recipient_id: RecipientId,
        /// Name of the attachment.
        file_name: String,
        /// Human-readable reason.
        reason: String,
    },
    /// A recipient was skipped without contacting the provider.
    RecipientSkipped {
        /// Name of the recipient.
        display_name: String,
        /// Why the recipient was skipped.
        reason: String,
    },
    /// The run ended.
    Finished {
        /// The final tally.
        summary: DispatchSummary,
    },
}

impl DispatchEvent {
    /// Short tag naming the event variant (matches the serde `type` field).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Progress { .. } => "progress",
            Self::RecipientFailed { .. } => "recipient_failed",
            Self::AttachmentFailed { .. } => "attachment_failed",
            Self::RecipientSkipped { .. } => "recipient_skipped",
            Self::Finished { .. } => "finished",
        }
    }
}
