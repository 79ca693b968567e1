use std::collections::HashSet;

use crate::types::RecipientId;

/// The set of recipients the operator has chosen.
///
/// Membership only; insertion order is irrelevant. The dispatch path reads a
/// snapshot of this set and resolves it against the directory order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<RecipientId>,
}

impl SelectionSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`. Returns `true` if `id` is now selected.
    pub fn toggle(&mut self, id: &RecipientId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Select every identifier in `ids` (existing members stay selected).
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RecipientId>) {
        self.ids.extend(ids.into_iter().cloned());
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &RecipientId) -> bool {
        self.ids.contains(id)
    }

    /// Number of selected identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop selected identifiers that are not in `known`. Returns how many
    /// were removed.
    pub fn retain_known<'a>(&mut self, known: impl IntoIterator<Item = &'a RecipientId>) -> usize {
        let known: HashSet<&RecipientId> = known.into_iter().collect();
        let before = self.ids.len();
        self.ids.retain(|id| known.contains(id));
        before - self.ids.len()
    }

    /// Iterate over the selected identifiers in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &RecipientId> {
        self.ids.iter()
    }
}
