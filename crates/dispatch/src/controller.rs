use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use herald_core::{Attachment, DispatchEvent, DispatchSummary, Recipient};
use herald_transport::DynTransport;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::run::{ActiveRun, RunGuard};
use crate::status::{DispatchRun, DispatchState, DispatchStatus};

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Result of [`DispatchController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run executed to completion or was stopped.
    Finished(DispatchSummary),
    /// Another run was already active; nothing happened.
    AlreadyRunning,
}

/// Result of [`DispatchController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A run was spawned in the background.
    Started {
        /// Recipients in the run.
        total: usize,
    },
    /// Another run was already active; nothing happened.
    AlreadyRunning,
}

/// State shared between the controller handle and the active run.
pub(crate) struct Shared {
    pub(crate) transport: Arc<dyn DynTransport>,
    pub(crate) running: AtomicBool,
    pub(crate) stop_tx: watch::Sender<bool>,
    pub(crate) events: broadcast::Sender<DispatchEvent>,
    pub(crate) status: Mutex<DispatchStatus>,
    pub(crate) metrics: DispatchMetrics,
    tracker: TaskTracker,
}

impl Shared {
    pub(crate) fn emit(&self, event: DispatchEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub(crate) fn update_progress(&self, f: impl FnOnce(&mut DispatchRun)) {
        if let Some(progress) = self.status.lock().progress.as_mut() {
            f(progress);
        }
    }
}

/// Drives broadcast runs, one at a time.
///
/// Cloning is cheap; all clones share the same run guard, stop signal, event
/// channel and metrics.
#[derive(Clone)]
pub struct DispatchController {
    shared: Arc<Shared>,
}

impl DispatchController {
    /// Create a controller sending through `transport`.
    pub fn new(transport: Arc<dyn DynTransport>) -> Self {
        Self::with_event_capacity(transport, DEFAULT_EVENT_CAPACITY)
    }

    /// Create a controller with a custom event channel capacity.
    pub fn with_event_capacity(transport: Arc<dyn DynTransport>, capacity: usize) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                transport,
                running: AtomicBool::new(false),
                stop_tx,
                events,
                status: Mutex::new(DispatchStatus::default()),
                metrics: DispatchMetrics::default(),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Validate the request and claim the run guard.
    ///
    /// Returns `Ok(None)` when a run is already active. The returned
    /// [`ActiveRun`] holds the guard until it is executed or dropped.
    pub fn begin(
        &self,
        recipients: Vec<Recipient>,
        body: impl Into<String>,
        attachments: Vec<Attachment>,
        delay: Duration,
    ) -> Result<Option<ActiveRun>, ValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if recipients.is_empty() {
            return Err(ValidationError::NoRecipients);
        }

        // Claiming the guard and clearing the stop signal happen under the
        // status lock so a concurrent `request_stop` lands before or after
        // both, never between them.
        let guard = {
            let mut status = self.shared.status.lock();
            if self
                .shared
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!("dispatch already running, ignoring start");
                return Ok(None);
            }
            self.shared.stop_tx.send_replace(false);
            status.state = DispatchState::Running;
            status.progress = Some(DispatchRun::new(recipients.len()));
            RunGuard::new(Arc::clone(&self.shared))
        };
        self.shared.metrics.increment_runs_started();

        info!(
            recipients = recipients.len(),
            attachments = attachments.len(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "dispatch run starting"
        );

        Ok(Some(ActiveRun::new(
            guard,
            self.shared.stop_tx.subscribe(),
            recipients,
            body,
            attachments,
            delay,
        )))
    }

    /// Run a broadcast to completion on the current task.
    ///
    /// Never fails once started; per-recipient failures are counted in the
    /// summary and reported as events.
    pub async fn run(
        &self,
        recipients: Vec<Recipient>,
        body: impl Into<String>,
        attachments: Vec<Attachment>,
        delay: Duration,
    ) -> Result<RunOutcome, ValidationError> {
        match self.begin(recipients, body, attachments, delay)? {
            Some(run) => Ok(RunOutcome::Finished(run.execute().await)),
            None => Ok(RunOutcome::AlreadyRunning),
        }
    }

    /// Start a broadcast on a background task.
    pub fn start(
        &self,
        recipients: Vec<Recipient>,
        body: impl Into<String>,
        attachments: Vec<Attachment>,
        delay: Duration,
    ) -> Result<StartOutcome, ValidationError> {
        match self.begin(recipients, body, attachments, delay)? {
            Some(run) => {
                let total = run.total();
                self.shared.tracker.spawn(run.execute());
                Ok(StartOutcome::Started { total })
            }
            None => Ok(StartOutcome::AlreadyRunning),
        }
    }

    /// Ask the active run to stop at the next recipient boundary.
    ///
    /// Wakes a pending pacing wait. An in-flight send is never aborted.
    /// Returns whether a run was active.
    pub fn request_stop(&self) -> bool {
        {
            let mut status = self.shared.status.lock();
            if !self.is_running() {
                return false;
            }
            self.shared.stop_tx.send_replace(true);
            if let Some(progress) = status.progress.as_mut() {
                progress.stop_requested = true;
            }
        }
        info!("dispatch stop requested");
        true
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Subscribe to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.shared.events.subscribe()
    }

    /// Current state, live progress and the last summary.
    pub fn status(&self) -> DispatchStatus {
        self.shared.status.lock().clone()
    }

    /// Lifetime counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Stop any active run and wait for background runs to finish.
    pub async fn shutdown(&self) {
        self.request_stop();
        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        info!("dispatch controller shutdown complete");
    }
}

impl std::fmt::Debug for DispatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchController")
            .field("transport", &self.shared.transport.name())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
