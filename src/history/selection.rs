//! Multi-select state for bulk history actions

use std::collections::BTreeSet;

use crate::client::models::ScanSession;

/// Set of selected session IDs, kept apart from the collection itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one ID. Returns true if it is now selected.
    #[allow(dead_code)]
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Select exactly the sessions in `view`, dropping anything else.
    pub fn select_all(&mut self, view: &[&ScanSession]) {
        self.ids = view.iter().map(|s| s.id.clone()).collect();
    }

    /// Clear if every session in `view` is already selected, else select `view`.
    #[allow(dead_code)]
    pub fn toggle_all(&mut self, view: &[&ScanSession]) {
        let all_selected = !view.is_empty() && view.iter().all(|s| self.ids.contains(&s.id));
        if all_selected {
            self.clear();
        } else {
            self.select_all(view);
        }
    }

    #[allow(dead_code)]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Drop IDs that no longer exist.
    pub fn remove<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    /// Keep only IDs accepted by `keep`.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected IDs in sorted order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::ScanSessionBuilder;

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert!(selection.contains("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_replaces_selection() {
        let sessions = [
            ScanSessionBuilder::new("a").build(),
            ScanSessionBuilder::new("b").build(),
        ];
        let view: Vec<&ScanSession> = sessions.iter().collect();

        let mut selection = Selection::new();
        selection.toggle("stale");
        selection.select_all(&view);

        assert_eq!(selection.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_all_clears_when_view_fully_selected() {
        let sessions = [
            ScanSessionBuilder::new("a").build(),
            ScanSessionBuilder::new("b").build(),
        ];
        let view: Vec<&ScanSession> = sessions.iter().collect();

        let mut selection = Selection::new();
        selection.toggle("a");
        selection.toggle_all(&view);
        assert_eq!(selection.len(), 2);

        selection.toggle_all(&view);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_on_empty_view_clears() {
        let mut selection = Selection::new();
        selection.toggle("a");
        selection.toggle_all(&[]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_remove_and_retain() {
        let mut selection = Selection::new();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("c");

        selection.remove(&["a".to_string()]);
        selection.retain(|id| id != "c");

        assert_eq!(selection.ids(), vec!["b"]);
    }
}
