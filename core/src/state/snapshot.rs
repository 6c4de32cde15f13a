//! The serialisable projection of an `AppState`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::types::{AppState, Entity, Filters, Pagination, UiFlags, ViewMode};
use crate::error::StorageError;

/// Written to key-value storage after every persisting mutation.
///
/// There is no schema version: a blob that fails to deserialize is treated as
/// absent and the store starts from defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "X: Serialize", deserialize = "X: DeserializeOwned"))]
pub struct PersistedSnapshot<E: Entity, X> {
    pub items: Vec<E>,
    #[serde(default)]
    pub selected: BTreeSet<E::Id>,
    #[serde(default)]
    pub filters: Filters<E::FilterKey>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub view_mode: ViewMode,
    pub extra: X,
    pub saved_at: DateTime<Utc>,
}

fn first_page() -> u32 {
    1
}

impl<E: Entity, X: Clone> PersistedSnapshot<E, X> {
    pub fn capture(state: &AppState<E, X>) -> Self {
        Self {
            items: state.items.clone(),
            selected: state.selected.clone(),
            filters: state.filters.clone(),
            page: state.pagination.page,
            view_mode: state.ui.view_mode,
            extra: state.extra.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuilds a state; transient UI flags start cleared.
    pub fn restore(self, page_size: u32) -> AppState<E, X> {
        let mut state = AppState {
            items: self.items,
            selected: self.selected,
            filters: self.filters,
            pagination: Pagination {
                page: self.page.max(1),
                ..Pagination::new(page_size)
            },
            ui: UiFlags {
                view_mode: self.view_mode,
                ..UiFlags::default()
            },
            extra: self.extra,
        };
        state.refresh_pagination();
        state
    }
}

impl<E: Entity, X: Serialize + DeserializeOwned> PersistedSnapshot<E, X> {
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::test_fixtures::*;

    #[test]
    fn snapshot_round_trip_preserves_persisted_fields() {
        let mut state: AppState<Fruit, Vec<String>> = AppState::new(2);
        state.items = basket(5);
        state.selected.insert(3);
        state.filters.insert(FruitFilter::Color, "red".into());
        state.pagination.page = 2;
        state.ui.view_mode = ViewMode::List;
        state.ui.is_loading = true;
        state.extra = vec!["note".into()];

        let json = PersistedSnapshot::capture(&state).to_json().unwrap();
        let restored = PersistedSnapshot::<Fruit, Vec<String>>::from_json(&json)
            .unwrap()
            .restore(2);

        assert_eq!(restored.items, state.items);
        assert_eq!(restored.selected, state.selected);
        assert_eq!(restored.filters, state.filters);
        assert_eq!(restored.pagination.page, 2);
        assert_eq!(restored.ui.view_mode, ViewMode::List);
        assert!(!restored.ui.is_loading);
        assert_eq!(restored.extra, state.extra);
    }

    #[test]
    fn malformed_json_is_an_error_not_a_panic() {
        let err = PersistedSnapshot::<Fruit, ()>::from_json(r#"{"items": 7}"#).unwrap_err();
        assert!(matches!(err, StorageError::Serialize(_)));
    }
}
