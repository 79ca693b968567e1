//! Operator-side state: the loaded directory, the selection and the staged
//! attachments.
//!
//! Everything lives in memory and is lost on restart.

use herald_core::{
    Attachment, AttachmentError, AttachmentLimits, AttachmentList, Recipient, RecipientId,
    SelectionSet,
};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Inner {
    recipients: Vec<Recipient>,
    selection: SelectionSet,
    attachments: AttachmentList,
}

/// Inputs for one broadcast, copied under a single lock.
#[derive(Debug, Clone)]
pub struct DispatchSnapshot {
    /// Selected recipients in directory order.
    pub recipients: Vec<Recipient>,
    /// Staged attachments in staging order.
    pub attachments: Vec<Attachment>,
}

/// In-memory operator state shared by the API handlers.
#[derive(Debug)]
pub struct Workspace {
    inner: RwLock<Inner>,
}

impl Workspace {
    /// Create an empty workspace with the given attachment limits.
    pub fn new(limits: AttachmentLimits) -> Self {
        Self {
            inner: RwLock::new(Inner {
                attachments: AttachmentList::new(limits),
                ..Inner::default()
            }),
        }
    }

    /// Replace the directory, dropping selected ids that no longer exist.
    ///
    /// Returns how many selected ids were dropped.
    pub fn replace_recipients(&self, recipients: Vec<Recipient>) -> usize {
        let mut inner = self.inner.write();
        let pruned = inner
            .selection
            .retain_known(recipients.iter().filter_map(|r| r.recipient_id.as_ref()));
        inner.recipients = recipients;
        pruned
    }

    /// The loaded recipients with their selection flag.
    pub fn recipients(&self) -> Vec<(Recipient, bool)> {
        let inner = self.inner.read();
        inner
            .recipients
            .iter()
            .map(|r| {
                let selected = r
                    .recipient_id
                    .as_ref()
                    .is_some_and(|id| inner.selection.contains(id));
                (r.clone(), selected)
            })
            .collect()
    }

    /// Number of loaded recipients.
    pub fn recipient_count(&self) -> usize {
        self.inner.read().recipients.len()
    }

    /// Flip selection of a loaded recipient. Returns the new membership, or
    /// `None` when no loaded recipient has this id.
    pub fn toggle(&self, id: &RecipientId) -> Option<bool> {
        let mut inner = self.inner.write();
        let known = inner
            .recipients
            .iter()
            .any(|r| r.recipient_id.as_ref() == Some(id));
        known.then(|| inner.selection.toggle(id))
    }

    /// Select every addressable recipient. Returns the selection size.
    pub fn select_all(&self) -> usize {
        let mut inner = self.inner.write();
        let Inner {
            recipients,
            selection,
            ..
        } = &mut *inner;
        selection.select_all(recipients.iter().filter_map(|r| r.recipient_id.as_ref()));
        selection.len()
    }

    /// Clear the selection.
    pub fn clear_selection(&self) {
        self.inner.write().selection.clear();
    }

    /// Selected ids in directory order.
    pub fn selected_ids(&self) -> Vec<RecipientId> {
        let inner = self.inner.read();
        inner
            .recipients
            .iter()
            .filter_map(|r| r.recipient_id.as_ref())
            .filter(|id| inner.selection.contains(id))
            .cloned()
            .collect()
    }

    /// Stage an attachment.
    pub fn add_attachment(&self, attachment: Attachment) -> Result<(), AttachmentError> {
        self.inner.write().attachments.push(attachment)
    }

    /// Remove a staged attachment.
    pub fn remove_attachment(&self, id: Uuid) -> Option<Attachment> {
        self.inner.write().attachments.remove(id)
    }

    /// Remove every staged attachment.
    pub fn clear_attachments(&self) -> Vec<Attachment> {
        self.inner.write().attachments.clear()
    }

    /// Staged attachments in staging order.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.inner.read().attachments.snapshot()
    }

    /// The attachment limits in force.
    pub fn attachment_limits(&self) -> AttachmentLimits {
        self.inner.read().attachments.limits()
    }

    /// Copy the selected recipients and staged attachments for a run.
    ///
    /// Later changes to the workspace do not affect the copy.
    pub fn snapshot(&self) -> DispatchSnapshot {
        let inner = self.inner.read();
        DispatchSnapshot {
            recipients: inner
                .recipients
                .iter()
                .filter(|r| {
                    r.recipient_id
                        .as_ref()
                        .is_some_and(|id| inner.selection.contains(id))
                })
                .cloned()
                .collect(),
            attachments: inner.attachments.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        let ws = Workspace::new(AttachmentLimits::default());
        ws.replace_recipients(vec![
            Recipient::new("Harbor", "120363000000000001"),
            Recipient::unaddressed("Hill"),
            Recipient::new("Orchard", "120363000000000002"),
        ]);
        ws
    }

    fn id(raw: &str) -> RecipientId {
        RecipientId::new(raw).unwrap()
    }

    #[test]
    fn toggle_known_and_unknown() {
        let ws = workspace();
        assert_eq!(ws.toggle(&id("120363000000000002")), Some(true));
        assert_eq!(ws.toggle(&id("120363000000000002")), Some(false));
        assert_eq!(ws.toggle(&id("999")), None);
        assert!(ws.selected_ids().is_empty());
    }

    #[test]
    fn select_all_skips_unaddressed() {
        let ws = workspace();
        assert_eq!(ws.select_all(), 2);
        let flags: Vec<bool> = ws.recipients().into_iter().map(|(_, s)| s).collect();
        assert_eq!(flags, [true, false, true]);
        ws.clear_selection();
        assert!(ws.selected_ids().is_empty());
    }

    #[test]
    fn reload_prunes_vanished_ids() {
        let ws = workspace();
        ws.select_all();
        let pruned = ws.replace_recipients(vec![Recipient::new("Orchard", "120363000000000002")]);
        assert_eq!(pruned, 1);
        assert_eq!(ws.selected_ids(), [id("120363000000000002")]);
    }

    #[test]
    fn snapshot_is_in_directory_order_and_detached() {
        let ws = workspace();
        ws.toggle(&id("120363000000000002"));
        ws.toggle(&id("120363000000000001"));
        ws.add_attachment(Attachment::new("a.pdf", "https://files.example/a.pdf"))
            .unwrap();

        let snap = ws.snapshot();
        ws.clear_selection();
        ws.clear_attachments();

        let names: Vec<_> = snap.recipients.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, ["Harbor", "Orchard"]);
        assert_eq!(snap.attachments.len(), 1);
    }

    #[test]
    fn attachment_limits_apply() {
        let ws = Workspace::new(AttachmentLimits {
            max_count: 1,
            max_size_bytes: 10,
        });
        ws.add_attachment(Attachment::new("a.pdf", "https://f/a.pdf").with_size(5))
            .unwrap();
        let err = ws
            .add_attachment(Attachment::new("b.pdf", "https://f/b.pdf"))
            .unwrap_err();
        assert_eq!(err, AttachmentError::TooMany { max: 1 });
    }
}
