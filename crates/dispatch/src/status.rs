use herald_core::DispatchSummary;
use serde::Serialize;

/// Lifecycle state of the controller.
///
/// `Completed` and `Stopped` describe the most recent run; a new run may be
/// started from any state except `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// No run has happened yet.
    #[default]
    Idle,
    /// A run is in progress.
    Running,
    /// The last run processed every recipient.
    Completed,
    /// The last run ended early on a stop request.
    Stopped,
}

/// Live progress of the active run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchRun {
    /// Recipients in the run.
    pub total: usize,
    /// Recipients whose text message was accepted.
    pub sent: usize,
    /// Recipients whose text message failed.
    pub errors: usize,
    /// Attachment sends that failed.
    pub attachment_errors: usize,
    /// Recipients skipped without contacting the provider.
    pub skipped: usize,
    /// Whether a stop has been requested.
    pub stop_requested: bool,
}

impl DispatchRun {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Recipients examined so far.
    pub fn processed(&self) -> usize {
        self.sent + self.errors + self.skipped
    }
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStatus {
    /// Current lifecycle state.
    pub state: DispatchState,
    /// Progress of the active run, if one is running.
    pub progress: Option<DispatchRun>,
    /// Summary of the most recent finished run.
    pub last_summary: Option<DispatchSummary>,
}
