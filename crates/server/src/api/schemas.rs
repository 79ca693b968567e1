use herald_core::{Attachment, RecipientId};
use herald_dispatch::{DispatchStatus, MetricsSnapshot};
use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Messaging provider health.
    pub transport: TransportHealth,
    /// Name of the directory source.
    pub directory: String,
    /// Number of loaded recipients.
    pub recipients: usize,
    /// Lifetime dispatch counters.
    pub metrics: MetricsSnapshot,
}

/// Result of the provider health check.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransportHealth {
    /// Provider name.
    pub name: String,
    /// Whether the check succeeded.
    pub healthy: bool,
    /// Check failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for `GET /v1/recipients`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipientQuery {
    /// Case-insensitive substring of the display name.
    pub q: Option<String>,
}

/// One row of the recipient list.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientView {
    /// Name shown to the operator.
    pub display_name: String,
    /// Provider identifier, absent for rows that cannot be sent to.
    pub recipient_id: Option<RecipientId>,
    /// Whether the recipient is in the selection.
    pub selected: bool,
}

/// `GET /v1/recipients` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientsResponse {
    /// Matching recipients in directory order.
    pub recipients: Vec<RecipientView>,
    /// Number of loaded recipients before filtering.
    pub total: usize,
    /// Size of the selection.
    pub selected: usize,
}

/// `POST /v1/recipients/reload` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    /// Recipients now loaded.
    pub loaded: usize,
    /// Selected ids dropped because they vanished from the directory.
    pub pruned: usize,
}

/// `POST /v1/selection/toggle` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleRequest {
    /// Identifier of the recipient to toggle.
    pub id: String,
}

/// `POST /v1/selection/toggle` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    /// The toggled identifier.
    pub id: RecipientId,
    /// Membership after the toggle.
    pub selected: bool,
}

/// Current selection.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectionResponse {
    /// Selected identifiers in directory order.
    pub ids: Vec<RecipientId>,
    /// Number of selected identifiers.
    pub count: usize,
}

/// Query parameters for a raw attachment upload.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Name presented to recipients.
    pub file_name: String,
}

/// `POST /v1/attachments/url` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlAttachmentRequest {
    /// Absolute URL the provider downloads the file from.
    pub url: String,
    /// Name presented to recipients.
    pub file_name: String,
    /// Declared size, checked against the size limit.
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Staged attachments and the limits in force.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttachmentsResponse {
    /// Staged attachments in staging order.
    pub attachments: Vec<Attachment>,
    /// Maximum number of attachments.
    pub max_count: usize,
    /// Maximum size of one attachment.
    pub max_size_bytes: u64,
}

/// Count of removed items.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    /// How many items were removed.
    pub removed: usize,
}

/// `POST /v1/dispatch` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Text sent to every selected recipient.
    pub message: String,
}

/// `POST /v1/dispatch` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct DispatchStartResponse {
    /// `"started"` or `"already_running"`.
    pub status: String,
    /// Recipients in the new run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

/// `POST /v1/dispatch/stop` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopResponse {
    /// Whether a run was active to receive the request.
    pub stop_requested: bool,
}

/// `GET /v1/dispatch` response.
#[derive(Debug, Serialize)]
pub struct DispatchStatusResponse {
    /// Controller state, live progress and the last summary.
    #[serde(flatten)]
    pub status: DispatchStatus,
    /// Lifetime dispatch counters.
    pub metrics: MetricsSnapshot,
}
