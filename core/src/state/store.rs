//! The single owner of an app's state.

use std::sync::Arc;

use super::snapshot::PersistedSnapshot;
use super::types::{AppState, Entity, Extra, Filters, ViewMode};
use crate::error::{AppError, ErrorInfo, FetchError, StorageError};
use crate::storage::KeyValueStore;

/// Result of a persisting mutation.
///
/// Storage failures never surface as errors from the mutating call: the
/// in-memory state is updated regardless and `persisted` reports whether the
/// snapshot reached storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: bool,
}

impl<T> Mutation<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Captures the query a fetch was started for.
///
/// A catalog ticket carries no query or filters: its result is the whole
/// collection and stays valid whatever the user filters on meanwhile.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket<K: Ord> {
    pub generation: u64,
    pub query: String,
    pub filters: Filters<K>,
    pub catalog: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    Applied { count: usize, persisted: bool },
    Failed,
    /// A newer fetch was started, or the query moved on since.
    Stale,
}

pub struct Store<E: Entity, X = ()> {
    state: AppState<E, X>,
    kv: Arc<dyn KeyValueStore>,
    key: String,
    fetch_generation: u64,
}

impl<E: Entity, X: Extra> Store<E, X> {
    /// Starts empty; nothing is read from storage.
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>, page_size: u32) -> Self {
        Self {
            state: AppState::new(page_size),
            kv,
            key: key.into(),
            fetch_generation: 0,
        }
    }

    /// Restores the snapshot stored under `key`.
    ///
    /// Missing, unreadable or malformed data falls back to an empty state.
    pub fn load_from_storage(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        page_size: u32,
    ) -> Self {
        let mut store = Self::new(kv, key, page_size);
        store.reload(page_size);
        store
    }

    fn reload(&mut self, page_size: u32) {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(target: "pagestate.store", key = %self.key, "no stored snapshot");
                return;
            }
            Err(err) => {
                tracing::warn!(target: "pagestate.store", key = %self.key, error = %err, "storage read failed, using defaults");
                return;
            }
        };
        match PersistedSnapshot::<E, X>::from_json(&raw) {
            Ok(snapshot) => {
                self.state = snapshot.restore(page_size);
                tracing::debug!(
                    target: "pagestate.store",
                    key = %self.key,
                    items = self.state.items.len(),
                    selected = self.state.selected.len(),
                    "snapshot restored"
                );
            }
            Err(err) => {
                tracing::warn!(target: "pagestate.store", key = %self.key, error = %err, "stored snapshot unreadable, resetting to defaults");
            }
        }
    }

    pub fn state(&self) -> &AppState<E, X> {
        &self.state
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Writes the current snapshot to storage.
    pub fn persist(&self) -> Result<(), StorageError> {
        let json = PersistedSnapshot::capture(&self.state).to_json()?;
        self.kv.set(&self.key, &json)
    }

    fn persist_logged(&self) -> bool {
        match self.persist() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "pagestate.store", key = %self.key, error = %err, "persist failed");
                false
            }
        }
    }

    fn commit<T>(&mut self, value: T) -> Mutation<T> {
        self.state.refresh_pagination();
        Mutation {
            value,
            persisted: self.persist_logged(),
        }
    }

    /// Drops the stored snapshot and resets to an empty state.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        let page_size = self.state.pagination.page_size;
        self.state = AppState::new(page_size);
        self.kv.remove(&self.key)
    }

    pub fn set_items(&mut self, items: Vec<E>) -> Mutation<()> {
        self.state.items = items;
        self.state.pagination.page = 1;
        self.commit(())
    }

    /// Appends a new item; ids must be unique.
    pub fn add_item(&mut self, item: E) -> Result<Mutation<()>, AppError> {
        if self.state.item(item.id()).is_some() {
            return Err(AppError::validation(format!(
                "an item with id {} already exists",
                item.id()
            )));
        }
        self.state.items.push(item);
        Ok(self.commit(()))
    }

    /// Removes an item. Selections pointing at it are left in place.
    pub fn remove_item(&mut self, id: &E::Id) -> Result<Mutation<E>, AppError> {
        let idx = self
            .state
            .items
            .iter()
            .position(|it| it.id() == id)
            .ok_or_else(|| AppError::not_found(format!("item {id}")))?;
        let removed = self.state.items.remove(idx);
        Ok(self.commit(removed))
    }

    /// Mutates one item in place. When `f` fails nothing is changed.
    pub fn update_item<R>(
        &mut self,
        id: &E::Id,
        f: impl FnOnce(&mut E) -> Result<R, AppError>,
    ) -> Result<Mutation<R>, AppError> {
        let item = self
            .state
            .items
            .iter_mut()
            .find(|it| it.id() == id)
            .ok_or_else(|| AppError::not_found(format!("item {id}")))?;
        let mut draft = item.clone();
        let value = f(&mut draft)?;
        *item = draft;
        Ok(self.commit(value))
    }

    pub fn update_extra<R>(&mut self, f: impl FnOnce(&mut X) -> R) -> Mutation<R> {
        let value = f(&mut self.state.extra);
        self.commit(value)
    }

    /// Applies `f` to copies of the items and extra payload; they replace the
    /// live state only when `f` succeeds.
    pub fn transact<R>(
        &mut self,
        f: impl FnOnce(&mut Vec<E>, &mut X) -> Result<R, AppError>,
    ) -> Result<Mutation<R>, AppError> {
        let mut items = self.state.items.clone();
        let mut extra = self.state.extra.clone();
        let value = f(&mut items, &mut extra)?;
        self.state.items = items;
        self.state.extra = extra;
        Ok(self.commit(value))
    }

    /// Flips membership of `id` in the selection and returns the new membership.
    pub fn toggle_selection(&mut self, id: E::Id) -> Mutation<bool> {
        let member = if self.state.selected.remove(&id) {
            false
        } else {
            self.state.selected.insert(id);
            true
        };
        self.commit(member)
    }

    /// Adds `id`; returns false when it was already selected.
    pub fn select(&mut self, id: E::Id) -> Mutation<bool> {
        let added = self.state.selected.insert(id);
        self.commit(added)
    }

    /// Removes `id`; returns false when it was not selected.
    pub fn deselect(&mut self, id: &E::Id) -> Mutation<bool> {
        let removed = self.state.selected.remove(id);
        self.commit(removed)
    }

    /// Sets a filter; a blank value clears it. Always returns to page 1.
    pub fn set_filter(&mut self, key: E::FilterKey, value: impl Into<String>) -> Mutation<()> {
        let value = value.into();
        if value.trim().is_empty() {
            self.state.filters.remove(&key);
        } else {
            self.state.filters.insert(key, value);
        }
        self.state.pagination.page = 1;
        self.commit(())
    }

    pub fn clear_filters(&mut self) -> Mutation<()> {
        self.state.filters.clear();
        self.state.pagination.page = 1;
        self.commit(())
    }

    /// Reveals the next page when there is one.
    pub fn next_page(&mut self) -> Mutation<bool> {
        if !self.state.pagination.has_more {
            return Mutation {
                value: false,
                persisted: true,
            };
        }
        self.state.pagination.page += 1;
        self.commit(true)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Mutation<()> {
        self.state.ui.view_mode = mode;
        self.commit(())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.ui.is_loading = loading;
    }

    pub fn set_error(&mut self, error: ErrorInfo) {
        self.state.ui.error = Some(error);
        self.state.ui.is_loading = false;
    }

    pub fn clear_error(&mut self) {
        self.state.ui.error = None;
    }

    /// Marks a fetch as in flight for the current query and filters.
    pub fn begin_fetch(&mut self) -> FetchTicket<E::FilterKey> {
        let query = self.state.query().to_string();
        let filters = self.state.filters.clone();
        self.next_ticket(query, filters, false)
    }

    /// Marks a fetch of the unfiltered catalog as in flight.
    pub fn begin_catalog_fetch(&mut self) -> FetchTicket<E::FilterKey> {
        self.next_ticket(String::new(), Filters::new(), true)
    }

    fn next_ticket(
        &mut self,
        query: String,
        filters: Filters<E::FilterKey>,
        catalog: bool,
    ) -> FetchTicket<E::FilterKey> {
        self.fetch_generation += 1;
        self.state.ui.is_loading = true;
        self.state.ui.error = None;
        FetchTicket {
            generation: self.fetch_generation,
            query,
            filters,
            catalog,
        }
    }

    /// Applies a fetch result if it still answers the current question.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket<E::FilterKey>,
        result: Result<Vec<E>, FetchError>,
    ) -> FetchApplied {
        if ticket.generation != self.fetch_generation {
            tracing::debug!(
                target: "pagestate.store",
                ticket = ticket.generation,
                current = self.fetch_generation,
                "dropping response from superseded fetch"
            );
            return FetchApplied::Stale;
        }
        self.state.ui.is_loading = false;
        if !ticket.catalog && ticket.filters != self.state.filters {
            tracing::debug!(target: "pagestate.store", query = %ticket.query, "dropping response for outdated query");
            return FetchApplied::Stale;
        }
        match result {
            Ok(items) => {
                let count = items.len();
                let persisted = self.set_items(items).persisted;
                FetchApplied::Applied { count, persisted }
            }
            Err(err) => {
                tracing::warn!(target: "pagestate.store", error = %err, "fetch failed");
                self.set_error(AppError::from(err).to_error_info());
                FetchApplied::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchFailure, FetchFailureKind};
    use crate::state::types::test_fixtures::*;
    use crate::storage::MemoryKv;

    fn store(page_size: u32) -> (Arc<MemoryKv>, Store<Fruit>) {
        let kv = Arc::new(MemoryKv::new());
        let store = Store::new(kv.clone(), "fruits", page_size);
        (kv, store)
    }

    #[test]
    fn toggle_selection_parity() {
        let (_, mut store) = store(10);
        for calls in 1..=7u32 {
            let member = store.toggle_selection(42).value;
            assert_eq!(member, calls % 2 == 1);
        }
        assert!(store.state().is_selected(&42));
    }

    #[test]
    fn toggling_unknown_id_is_permitted() {
        let (_, mut store) = store(10);
        store.set_items(basket(2)).into_value();
        assert!(store.toggle_selection(99).value);
        assert!(store.state().selected_items().is_empty());
    }

    #[test]
    fn set_filter_then_clear_restores_unfiltered_view() {
        let (_, mut store) = store(10);
        let _ = store.set_items(basket(6));
        let _ = store.set_filter(FruitFilter::Color, "red");
        assert_eq!(store.state().visible_items().len(), 3);

        let _ = store.set_filter(FruitFilter::Color, "");
        assert!(!store.state().filters.contains_key(&FruitFilter::Color));
        assert_eq!(store.state().visible_items().len(), 6);
    }

    #[test]
    fn set_filter_resets_page() {
        let (_, mut store) = store(2);
        let _ = store.set_items(basket(6));
        assert!(store.next_page().value);
        assert_eq!(store.state().pagination.page, 2);
        let _ = store.set_filter(FruitFilter::Search, "fruit");
        assert_eq!(store.state().pagination.page, 1);
    }

    #[test]
    fn next_page_without_more_is_noop() {
        let (_, mut store) = store(5);
        let _ = store.set_items(basket(3));
        assert!(!store.state().pagination.has_more);
        assert!(!store.next_page().value);
        assert_eq!(store.state().pagination.page, 1);
    }

    #[test]
    fn next_page_until_exhausted() {
        let (_, mut store) = store(2);
        let _ = store.set_items(basket(5));
        assert!(store.next_page().value);
        assert!(store.next_page().value);
        assert!(!store.next_page().value);
        assert_eq!(store.state().pagination.page, 3);
    }

    #[test]
    fn persist_and_reload_round_trip() {
        let (kv, mut store) = store(2);
        let _ = store.set_items(basket(5));
        let _ = store.toggle_selection(2);
        let _ = store.set_filter(FruitFilter::Color, "green");
        let _ = store.next_page();
        let _ = store.set_view_mode(ViewMode::List);

        let reloaded: Store<Fruit> = Store::load_from_storage(kv, "fruits", 2);
        let (a, b) = (store.state(), reloaded.state());
        assert_eq!(a.items, b.items);
        assert_eq!(a.selected, b.selected);
        assert_eq!(a.filters, b.filters);
        assert_eq!(a.pagination, b.pagination);
        assert_eq!(a.ui.view_mode, b.ui.view_mode);
    }

    #[test]
    fn malformed_storage_falls_back_to_defaults() {
        let kv = Arc::new(MemoryKv::new());
        kv.set("fruits", "{not json").unwrap();
        let store: Store<Fruit> = Store::load_from_storage(kv, "fruits", 4);
        assert!(store.state().items.is_empty());
        assert_eq!(store.state().pagination.page, 1);
    }

    #[test]
    fn quota_failure_is_reported_not_thrown() {
        let kv = Arc::new(MemoryKv::with_quota(16));
        let mut store: Store<Fruit> = Store::new(kv, "fruits", 4);
        let m = store.set_items(basket(10));
        assert!(!m.persisted);
        assert_eq!(store.state().items.len(), 10);
    }

    #[test]
    fn update_item_is_all_or_nothing() {
        let (_, mut store) = store(4);
        let _ = store.set_items(basket(2));
        let err = store
            .update_item(&1, |f| {
                f.name = "changed".into();
                Err::<(), _>(AppError::validation("nope"))
            })
            .unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(store.state().item(&1).unwrap().name, "fruit-1");

        store
            .update_item(&1, |f| {
                f.color = "blue".into();
                Ok(())
            })
            .unwrap()
            .into_value();
        assert_eq!(store.state().item(&1).unwrap().color, "blue");
        assert!(store.update_item(&9, |_| Ok(())).is_err());
    }

    #[test]
    fn add_item_rejects_duplicate_and_remove_keeps_selection() {
        let (_, mut store) = store(4);
        let _ = store.set_items(basket(2));
        assert!(store.add_item(fruit(2, "dup", "red")).is_err());
        let _ = store.select(2);
        let removed = store.remove_item(&2).unwrap().into_value();
        assert_eq!(removed.id, 2);
        assert!(store.state().is_selected(&2));
    }

    #[test]
    fn select_is_idempotent() {
        let (_, mut store) = store(4);
        assert!(store.select(1).value);
        assert!(!store.select(1).value);
        assert_eq!(store.state().selected.len(), 1);
        assert!(store.deselect(&1).value);
        assert!(!store.deselect(&1).value);
    }

    #[test]
    fn superseded_fetch_is_dropped() {
        let (_, mut store) = store(4);
        let _ = store.set_filter(FruitFilter::Search, "a");
        let first = store.begin_fetch();
        let _ = store.set_filter(FruitFilter::Search, "ab");
        let second = store.begin_fetch();

        assert_eq!(
            store.complete_fetch(&first, Ok(basket(1))),
            FetchApplied::Stale
        );
        assert!(store.state().ui.is_loading);
        assert_eq!(
            store.complete_fetch(&second, Ok(basket(3))),
            FetchApplied::Applied {
                count: 3,
                persisted: true
            }
        );
        assert!(!store.state().ui.is_loading);
        assert_eq!(store.state().items.len(), 3);
    }

    #[test]
    fn response_for_changed_query_is_dropped_and_loading_cleared() {
        let (_, mut store) = store(4);
        let ticket = store.begin_fetch();
        let _ = store.set_filter(FruitFilter::Color, "red");
        assert_eq!(
            store.complete_fetch(&ticket, Ok(basket(2))),
            FetchApplied::Stale
        );
        assert!(!store.state().ui.is_loading);
        assert!(store.state().items.is_empty());
    }

    #[test]
    fn catalog_fetch_survives_filter_changes() {
        let (_, mut store) = store(4);
        let _ = store.set_filter(FruitFilter::Search, "app");
        let ticket = store.begin_catalog_fetch();
        assert_eq!(ticket.query, "");
        assert!(ticket.filters.is_empty());

        let _ = store.set_filter(FruitFilter::Color, "red");
        assert_eq!(
            store.complete_fetch(&ticket, Ok(basket(3))),
            FetchApplied::Applied {
                count: 3,
                persisted: true
            }
        );
        assert_eq!(store.state().items.len(), 3);
        assert_eq!(store.state().query(), "app");
    }

    #[test]
    fn fetched_items_report_storage_failure() {
        let kv = Arc::new(MemoryKv::with_quota(8));
        let mut store: Store<Fruit> = Store::new(kv, "fruits", 4);
        let ticket = store.begin_catalog_fetch();
        assert_eq!(
            store.complete_fetch(&ticket, Ok(basket(3))),
            FetchApplied::Applied {
                count: 3,
                persisted: false
            }
        );
        assert_eq!(store.state().items.len(), 3);
    }

    #[test]
    fn failed_fetch_sets_retryable_error() {
        let (_, mut store) = store(4);
        let ticket = store.begin_fetch();
        let failure = FetchFailure::new(FetchFailureKind::Connect, "refused");
        assert_eq!(
            store.complete_fetch(&ticket, Err(failure.into())),
            FetchApplied::Failed
        );
        let ui = &store.state().ui;
        assert!(!ui.is_loading);
        assert!(ui.error.as_ref().unwrap().retryable);

        let _ = store.begin_fetch();
        assert!(store.state().ui.error.is_none());
    }

    #[test]
    fn transact_rolls_back_on_error() {
        let kv = Arc::new(MemoryKv::new());
        let mut store: Store<Fruit, u32> = Store::new(kv, "fruits", 4);
        let _ = store.set_items(basket(2));
        let res = store.transact(|items, extra| {
            items.clear();
            *extra = 7;
            Err::<(), _>(AppError::validation("rollback"))
        });
        assert!(res.is_err());
        assert_eq!(store.state().items.len(), 2);
        assert_eq!(store.state().extra, 0);
    }
}
