//! Selection tracking for bulk actions.

use std::collections::BTreeSet;

/// Ids currently selected in one list view.
///
/// The tracker does not notice when the list reloads; callers clear it
/// after a reload or once a bulk action completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    ids: BTreeSet<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Replace the selection with exactly `visible_ids`.
    pub fn select_all<I, S>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = visible_ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Selected records of `ordered`, in its order.
    pub fn visible_selection<'a, T>(&self, ordered: &'a [T], id_of: impl Fn(&T) -> &str) -> Vec<&'a T> {
        ordered
            .iter()
            .filter(|record| self.ids.contains(id_of(*record)))
            .collect()
    }
}
