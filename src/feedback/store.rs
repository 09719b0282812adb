// SPDX-License-Identifier: MPL-2.0
//! Keyed item store.
//!
//! The store is a passive map: every mutator is crate-private and only the
//! lifecycle manager calls them. Readers work on [`StoreState`] snapshots,
//! which are cheap to clone and never change once handed out.

use super::id::ItemId;
use super::item::FeedbackItem;
use super::kind::{FeedbackKind, Status};
use super::options::OptionsPatch;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable view of every resident item.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    items: HashMap<ItemId, FeedbackItem>,
    /// Ids in admission order.
    order: Vec<ItemId>,
    version: u64,
}

impl StoreState {
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&FeedbackItem> {
        self.items.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    /// Iterates over every item, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FeedbackItem> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }

    /// Returns every item, oldest first.
    #[must_use]
    pub fn get_all(&self) -> Vec<&FeedbackItem> {
        self.iter().collect()
    }

    #[must_use]
    pub fn get_by_kind(&self, kind: FeedbackKind) -> Vec<&FeedbackItem> {
        self.iter().filter(|item| item.kind() == kind).collect()
    }

    #[must_use]
    pub fn get_by_status(&self, status: Status) -> Vec<&FeedbackItem> {
        self.iter().filter(|item| item.status() == status).collect()
    }

    /// Number of `entering` or `visible` items of a kind.
    #[must_use]
    pub fn active_count(&self, kind: FeedbackKind) -> usize {
        self.iter()
            .filter(|item| item.kind() == kind && item.is_active())
            .count()
    }

    /// Oldest `entering` or `visible` item of a kind.
    #[must_use]
    pub fn oldest_active(&self, kind: FeedbackKind) -> Option<&FeedbackItem> {
        self.iter()
            .filter(|item| item.kind() == kind && item.is_active())
            .min_by_key(|item| item.seq())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Increases by one on every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Owner of the current [`StoreState`].
///
/// Each mutation works copy-on-write, so snapshots held by subscribers are
/// never modified underneath them.
#[derive(Debug, Default)]
pub struct Store {
    state: Arc<StoreState>,
}

impl Store {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StoreState> {
        Arc::clone(&self.state)
    }

    /// Borrows the current state without cloning the handle.
    #[must_use]
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&FeedbackItem> {
        self.state.get(id)
    }

    /// Inserts an item. Returns false, leaving the store untouched, if the
    /// id is already resident.
    pub(crate) fn add(&mut self, item: FeedbackItem) -> bool {
        if self.state.contains(item.id()) {
            return false;
        }
        let state = self.mutate();
        state.order.push(item.id().clone());
        state.items.insert(item.id().clone(), item);
        true
    }

    /// Merges a patch into an item. Unknown ids are ignored.
    pub(crate) fn update(&mut self, id: &ItemId, patch: OptionsPatch) -> bool {
        if !self.state.contains(id) {
            return false;
        }
        let state = self.mutate();
        match state.items.get_mut(id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Moves an item's status forward. Unknown ids and backward moves are
    /// ignored.
    pub(crate) fn set_status(&mut self, id: &ItemId, status: Status) -> bool {
        match self.state.get(id) {
            Some(item) if item.status() < status => {}
            _ => return false,
        }
        let state = self.mutate();
        state
            .items
            .get_mut(id)
            .is_some_and(|item| item.advance_to(status))
    }

    /// Deletes an item. Unknown ids are ignored.
    pub(crate) fn remove(&mut self, id: &ItemId) -> Option<FeedbackItem> {
        if !self.state.contains(id) {
            return None;
        }
        let state = self.mutate();
        state.order.retain(|existing| existing != id);
        state.items.remove(id)
    }

    /// Empties the store. Returns false if it was already empty.
    pub(crate) fn clear(&mut self) -> bool {
        if self.state.is_empty() {
            return false;
        }
        let state = self.mutate();
        state.items.clear();
        state.order.clear();
        true
    }

    fn mutate(&mut self) -> &mut StoreState {
        let state = Arc::make_mut(&mut self.state);
        state.version += 1;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::options::FeedbackOptions;

    fn item(id: &str, kind: FeedbackKind, seq: u64) -> FeedbackItem {
        FeedbackItem::new(ItemId::from(id), kind, FeedbackOptions::message(id), seq)
    }

    #[test]
    fn new_store_is_empty() {
        let store = Store::new();
        assert!(store.state().is_empty());
        assert_eq!(store.state().version(), 0);
    }

    #[test]
    fn add_rejects_duplicate_ids() {
        let mut store = Store::new();
        assert!(store.add(item("a", FeedbackKind::Toast, 0)));
        assert!(!store.add(item("a", FeedbackKind::Modal, 1)));
        assert_eq!(store.state().len(), 1);
        assert_eq!(store.state().version(), 1);
    }

    #[test]
    fn get_all_preserves_admission_order() {
        let mut store = Store::new();
        store.add(item("c", FeedbackKind::Toast, 0));
        store.add(item("a", FeedbackKind::Toast, 1));
        store.add(item("b", FeedbackKind::Toast, 2));

        let ids: Vec<&str> = store.state().iter().map(|i| i.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn update_and_remove_ignore_unknown_ids() {
        let mut store = Store::new();
        assert!(!store.update(&ItemId::from("ghost"), OptionsPatch::new().message("x")));
        assert!(store.remove(&ItemId::from("ghost")).is_none());
        assert!(!store.clear());
        assert_eq!(store.state().version(), 0);
    }

    #[test]
    fn update_merges_patch() {
        let mut store = Store::new();
        store.add(item("a", FeedbackKind::Toast, 0));
        assert!(store.update(&ItemId::from("a"), OptionsPatch::new().message("done")));

        let updated = store.get(&ItemId::from("a")).unwrap();
        assert_eq!(updated.message(), Some("done"));
        assert_eq!(updated.revision(), 1);
    }

    #[test]
    fn snapshots_are_not_affected_by_later_mutations() {
        let mut store = Store::new();
        store.add(item("a", FeedbackKind::Toast, 0));
        let before = store.snapshot();

        store.add(item("b", FeedbackKind::Toast, 1));
        store.set_status(&ItemId::from("a"), Status::Visible);

        assert_eq!(before.len(), 1);
        assert_eq!(
            before.get(&ItemId::from("a")).unwrap().status(),
            Status::Entering
        );
        assert_eq!(store.state().len(), 2);
        assert!(store.state().version() > before.version());
    }

    #[test]
    fn set_status_refuses_backward_moves() {
        let mut store = Store::new();
        store.add(item("a", FeedbackKind::Toast, 0));
        assert!(store.set_status(&ItemId::from("a"), Status::Exiting));
        let version = store.state().version();

        assert!(!store.set_status(&ItemId::from("a"), Status::Visible));
        assert_eq!(store.state().version(), version);
    }

    #[test]
    fn filters_by_kind_and_status() {
        let mut store = Store::new();
        store.add(item("t1", FeedbackKind::Toast, 0));
        store.add(item("m1", FeedbackKind::Modal, 1));
        store.add(item("t2", FeedbackKind::Toast, 2));
        store.set_status(&ItemId::from("t1"), Status::Exiting);

        assert_eq!(store.state().get_by_kind(FeedbackKind::Toast).len(), 2);
        assert_eq!(store.state().get_by_status(Status::Entering).len(), 2);
        assert_eq!(store.state().active_count(FeedbackKind::Toast), 1);
        assert_eq!(
            store
                .state()
                .oldest_active(FeedbackKind::Toast)
                .map(|i| i.id().as_str()),
            Some("t2")
        );
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = Store::new();
        store.add(item("a", FeedbackKind::Toast, 0));
        store.add(item("b", FeedbackKind::Banner, 1));
        assert!(store.clear());
        assert!(store.state().is_empty());
        assert_eq!(store.state().get_all().len(), 0);
    }
}
