use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use herald_core::{Attachment, ChatId, DispatchEvent, DispatchSummary, Recipient, RecipientId};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::controller::Shared;
use crate::status::DispatchState;

/// Holds the single-run guard; releasing it makes the controller idle again.
pub(crate) struct RunGuard {
    shared: Arc<Shared>,
}

impl RunGuard {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        {
            let mut status = self.shared.status.lock();
            // Only reached in this state when the run was dropped unexecuted.
            if status.state == DispatchState::Running {
                status.state = DispatchState::Idle;
                status.progress = None;
            }
        }
        self.shared.running.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct Tally {
    sent: usize,
    errors: usize,
    attachment_errors: usize,
    skipped: usize,
}

/// A validated run that owns the run guard and its input snapshot.
///
/// Created by [`DispatchController::begin`](crate::DispatchController::begin).
/// Dropping it without calling [`execute`](Self::execute) releases the guard.
pub struct ActiveRun {
    guard: RunGuard,
    stop_rx: watch::Receiver<bool>,
    recipients: Vec<Recipient>,
    body: String,
    attachments: Vec<Attachment>,
    delay: Duration,
    total: usize,
    tally: Tally,
}

impl ActiveRun {
    pub(crate) fn new(
        guard: RunGuard,
        stop_rx: watch::Receiver<bool>,
        recipients: Vec<Recipient>,
        body: String,
        attachments: Vec<Attachment>,
        delay: Duration,
    ) -> Self {
        Self {
            guard,
            stop_rx,
            total: recipients.len(),
            recipients,
            body,
            attachments,
            delay,
            tally: Tally::default(),
        }
    }

    /// Recipients in this run.
    pub fn total(&self) -> usize {
        self.total
    }

    fn shared(&self) -> &Shared {
        &self.guard.shared
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Process every recipient in order and return the final tally.
    pub async fn execute(mut self) -> DispatchSummary {
        let total = self.total();
        let started_at = Utc::now();
        let recipients = std::mem::take(&mut self.recipients);
        let mut stopped = false;

        self.shared().emit(DispatchEvent::Started { total });

        for (index, recipient) in recipients.iter().enumerate() {
            if self.stop_requested() {
                info!(
                    processed = index,
                    total, "dispatch stopped before next recipient"
                );
                stopped = true;
                break;
            }

            let Some((recipient_id, chat)) = self.resolve(recipient) else {
                continue;
            };

            self.deliver(recipient, recipient_id, &chat).await;

            let is_last = index + 1 == total;
            if !is_last && !self.stop_requested() && self.pace().await {
                debug!("pacing wait interrupted by stop request");
            }
        }

        self.finish(total, started_at, stopped)
    }

    /// Resolve the recipient's address, skipping it when there is none.
    fn resolve(&mut self, recipient: &Recipient) -> Option<(RecipientId, ChatId)> {
        let Some(id) = recipient.recipient_id.clone() else {
            self.skip(recipient, "recipient has no identifier");
            return None;
        };
        match self.shared().transport.normalize_recipient(&id) {
            Ok(chat) => Some((id, chat)),
            Err(e) => {
                self.skip(recipient, &e.to_string());
                None
            }
        }
    }

    fn skip(&mut self, recipient: &Recipient, reason: &str) {
        warn!(recipient = %recipient.display_name, reason, "skipping recipient");
        self.tally.skipped += 1;
        let skipped = self.tally.skipped;
        let shared = self.shared();
        shared.metrics.increment_recipients_skipped();
        shared.update_progress(|p| p.skipped = skipped);
        shared.emit(DispatchEvent::RecipientSkipped {
            display_name: recipient.display_name.clone(),
            reason: reason.to_owned(),
        });
    }

    async fn deliver(&mut self, recipient: &Recipient, recipient_id: RecipientId, chat: &ChatId) {
        let total = self.total;
        let transport = Arc::clone(&self.shared().transport);

        match transport.send_text(chat, &self.body).await {
            Ok(ack) => {
                debug!(
                    recipient = %recipient.display_name,
                    chat_id = %chat,
                    message_id = ack.message_id.as_deref().unwrap_or(""),
                    "message sent"
                );
                self.shared().metrics.increment_messages_sent();

                for attachment in &self.attachments {
                    match transport.send_file(chat, "", attachment).await {
                        Ok(_) => self.shared().metrics.increment_attachments_sent(),
                        Err(e) => {
                            warn!(
                                recipient = %recipient.display_name,
                                file_name = %attachment.file_name,
                                error = %e,
                                "attachment send failed"
                            );
                            self.tally.attachment_errors += 1;
                            let attachment_errors = self.tally.attachment_errors;
                            let shared = self.shared();
                            shared.metrics.increment_attachment_failures();
                            shared.update_progress(|p| p.attachment_errors = attachment_errors);
                            shared.emit(DispatchEvent::AttachmentFailed {
                                display_name: recipient.display_name.clone(),
                                recipient_id: recipient_id.clone(),
                                file_name: attachment.file_name.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }

                self.tally.sent += 1;
                let sent = self.tally.sent;
                let shared = self.shared();
                shared.update_progress(|p| p.sent = sent);
                shared.emit(DispatchEvent::Progress { sent, total });
                info!(recipient = %recipient.display_name, sent, total, "recipient done");
            }
            Err(e) => {
                warn!(
                    recipient = %recipient.display_name,
                    chat_id = %chat,
                    error = %e,
                    "message send failed"
                );
                self.record_failure(recipient, recipient_id, e.status(), e.to_string());
            }
        }
    }

    fn record_failure(
        &mut self,
        recipient: &Recipient,
        recipient_id: RecipientId,
        status: Option<u16>,
        reason: String,
    ) {
        self.tally.errors += 1;
        let errors = self.tally.errors;
        let shared = self.shared();
        shared.metrics.increment_send_failures();
        shared.update_progress(|p| p.errors = errors);
        shared.emit(DispatchEvent::RecipientFailed {
            display_name: recipient.display_name.clone(),
            recipient_id,
            status,
            reason,
        });
    }

    /// Wait for the pacing delay. Returns `true` if a stop request cut it short.
    async fn pace(&mut self) -> bool {
        tokio::select! {
            () = tokio::time::sleep(self.delay) => false,
            _ = self.stop_rx.wait_for(|stop| *stop) => true,
        }
    }

    fn finish(
        self,
        total: usize,
        started_at: chrono::DateTime<Utc>,
        stopped: bool,
    ) -> DispatchSummary {
        let summary = DispatchSummary {
            sent: self.tally.sent,
            errors: self.tally.errors,
            attachment_errors: self.tally.attachment_errors,
            skipped: self.tally.skipped,
            total,
            stopped,
            started_at,
            finished_at: Utc::now(),
        };

        let shared = Arc::clone(&self.guard.shared);
        {
            let mut status = shared.status.lock();
            status.state = if stopped {
                DispatchState::Stopped
            } else {
                DispatchState::Completed
            };
            status.progress = None;
            status.last_summary = Some(summary.clone());
        }
        if stopped {
            shared.metrics.increment_runs_stopped();
        } else {
            shared.metrics.increment_runs_completed();
        }

        info!(
            sent = summary.sent,
            errors = summary.errors,
            attachment_errors = summary.attachment_errors,
            skipped = summary.skipped,
            total,
            stopped,
            "dispatch run finished"
        );

        // The guard is released before `Finished` goes out.
        drop(self);
        shared.emit(DispatchEvent::Finished {
            summary: summary.clone(),
        });
        summary
    }
}
