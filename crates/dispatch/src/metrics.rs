use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lifetime counters across every dispatch run.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Runs that passed validation and acquired the run guard.
    pub runs_started: AtomicU64,
    /// Runs that processed every recipient.
    pub runs_completed: AtomicU64,
    /// Runs that ended early on a stop request.
    pub runs_stopped: AtomicU64,
    /// Text messages accepted by the provider.
    pub messages_sent: AtomicU64,
    /// Text messages that failed.
    pub send_failures: AtomicU64,
    /// Attachments accepted by the provider.
    pub attachments_sent: AtomicU64,
    /// Attachments that failed.
    pub attachment_failures: AtomicU64,
    /// Recipients skipped without contacting the provider.
    pub recipients_skipped: AtomicU64,
}

impl DispatchMetrics {
    /// Increment the runs started counter.
    pub fn increment_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the runs completed counter.
    pub fn increment_runs_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the runs stopped counter.
    pub fn increment_runs_stopped(&self) {
        self.runs_stopped.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the messages sent counter.
    pub fn increment_messages_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the send failures counter.
    pub fn increment_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the attachments sent counter.
    pub fn increment_attachments_sent(&self) {
        self.attachments_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the attachment failures counter.
    pub fn increment_attachment_failures(&self) {
        self.attachment_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the recipients skipped counter.
    pub fn increment_recipients_skipped(&self) {
        self.recipients_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_stopped: self.runs_stopped.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            attachments_sent: self.attachments_sent.load(Ordering::Relaxed),
            attachment_failures: self.attachment_failures.load(Ordering::Relaxed),
            recipients_skipped: self.recipients_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`DispatchMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Runs started.
    pub runs_started: u64,
    /// Runs completed.
    pub runs_completed: u64,
    /// Runs stopped early.
    pub runs_stopped: u64,
    /// Text messages sent.
    pub messages_sent: u64,
    /// Text messages failed.
    pub send_failures: u64,
    /// Attachments sent.
    pub attachments_sent: u64,
    /// Attachments failed.
    pub attachment_failures: u64,
    /// Recipients skipped.
    pub recipients_skipped: u64,
}
