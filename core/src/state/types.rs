//! State types shared by every app: the entity contract, the app-state record
//! and its pagination / UI flag parts.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ErrorInfo;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// A domain record held in a store.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Clone
        + Debug
        + Display
        + Ord
        + Hash
        + FromStr
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// The fixed set of filter keys for this kind of record.
    type FilterKey: Copy
        + Debug
        + Display
        + Ord
        + FromStr
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Filter key carrying free-text search.
    const SEARCH: Self::FilterKey;

    fn id(&self) -> &Self::Id;

    /// Whether this record passes a single filter criterion.
    fn matches(&self, key: Self::FilterKey, value: &str) -> bool;
}

/// Payload persisted next to the items, specific to one app.
pub trait Extra:
    Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Extra for T where
    T: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

pub type Filters<K> = BTreeMap<K, String>;

/// True when `item` passes every active filter.
pub fn matches_all<E: Entity>(item: &E, filters: &Filters<E::FilterKey>) -> bool {
    filters
        .iter()
        .all(|(key, value)| value.trim().is_empty() || item.matches(*key, value))
}

/// Case-insensitive substring test used by most `Entity::matches` impls.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack
        .to_lowercase()
        .contains(&needle.trim().to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            has_more: false,
        }
    }

    /// Number of items revealed up to and including `page`.
    pub fn revealed(&self, page: u32) -> usize {
        page as usize * self.page_size as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "list" => Ok(Self::List),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiFlags {
    pub is_loading: bool,
    pub error: Option<ErrorInfo>,
    pub view_mode: ViewMode,
}

/// Everything one app instance knows. Only a `Store` hands out `&mut`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState<E: Entity, X = ()> {
    pub items: Vec<E>,
    pub selected: BTreeSet<E::Id>,
    pub filters: Filters<E::FilterKey>,
    pub pagination: Pagination,
    pub ui: UiFlags,
    pub extra: X,
}

impl<E: Entity, X: Default> AppState<E, X> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            selected: BTreeSet::new(),
            filters: Filters::new(),
            pagination: Pagination::new(page_size),
            ui: UiFlags::default(),
            extra: X::default(),
        }
    }
}

impl<E: Entity, X: Default> Default for AppState<E, X> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<E: Entity, X> AppState<E, X> {
    pub fn item(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|it| it.id() == id)
    }

    pub fn is_selected(&self, id: &E::Id) -> bool {
        self.selected.contains(id)
    }

    pub fn filter(&self, key: E::FilterKey) -> Option<&str> {
        self.filters
            .get(&key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Current free-text query, empty when no search is active.
    pub fn query(&self) -> &str {
        self.filter(E::SEARCH).unwrap_or("")
    }

    pub fn has_filters(&self) -> bool {
        self.filters.values().any(|v| !v.trim().is_empty())
    }

    /// Items passing all active filters, in stored order.
    pub fn visible_items(&self) -> Vec<&E> {
        self.items
            .iter()
            .filter(|it| matches_all(*it, &self.filters))
            .collect()
    }

    /// The prefix of `visible_items` revealed by the current page.
    pub fn page_items(&self) -> Vec<&E> {
        let limit = self.pagination.revealed(self.pagination.page);
        self.visible_items().into_iter().take(limit).collect()
    }

    /// Items revealed after `previous_page`, up to the current page.
    pub fn revealed_since(&self, previous_page: u32) -> Vec<&E> {
        let start = self.pagination.revealed(previous_page);
        let end = self.pagination.revealed(self.pagination.page);
        self.visible_items()
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    /// Selected entities still present in `items`; stale ids are skipped.
    pub fn selected_items(&self) -> Vec<&E> {
        self.items
            .iter()
            .filter(|it| self.selected.contains(it.id()))
            .collect()
    }

    pub(crate) fn refresh_pagination(&mut self) {
        let visible = self.visible_items().len();
        let revealed = self.pagination.revealed(self.pagination.page);
        self.pagination.has_more = visible > revealed;
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use std::fmt;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Fruit {
        pub id: u32,
        pub name: String,
        pub color: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum FruitFilter {
        Search,
        Color,
    }

    impl fmt::Display for FruitFilter {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::Search => "search",
                Self::Color => "color",
            })
        }
    }

    impl FromStr for FruitFilter {
        type Err = String;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "search" => Ok(Self::Search),
                "color" => Ok(Self::Color),
                other => Err(other.to_string()),
            }
        }
    }

    impl Entity for Fruit {
        type Id = u32;
        type FilterKey = FruitFilter;
        const SEARCH: FruitFilter = FruitFilter::Search;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn matches(&self, key: FruitFilter, value: &str) -> bool {
            match key {
                FruitFilter::Search => contains_ci(&self.name, value),
                FruitFilter::Color => self.color.eq_ignore_ascii_case(value.trim()),
            }
        }
    }

    pub fn fruit(id: u32, name: &str, color: &str) -> Fruit {
        Fruit {
            id,
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    pub fn basket(n: u32) -> Vec<Fruit> {
        (1..=n)
            .map(|i| {
                let color = if i % 2 == 0 { "red" } else { "green" };
                fruit(i, &format!("fruit-{i}"), color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    #[test]
    fn page_items_and_revealed_since() {
        let mut state: AppState<Fruit> = AppState::new(3);
        state.items = basket(7);
        state.refresh_pagination();
        assert_eq!(state.page_items().len(), 3);
        assert!(state.pagination.has_more);

        state.pagination.page = 2;
        let revealed: Vec<u32> = state.revealed_since(1).iter().map(|f| f.id).collect();
        assert_eq!(revealed, vec![4, 5, 6]);

        state.pagination.page = 3;
        state.refresh_pagination();
        assert_eq!(state.revealed_since(2).len(), 1);
        assert!(!state.pagination.has_more);
    }

    #[test]
    fn blank_filter_values_are_ignored() {
        let mut state: AppState<Fruit> = AppState::default();
        state.items = basket(4);
        state.filters.insert(FruitFilter::Color, "  ".into());
        assert_eq!(state.visible_items().len(), 4);
        assert!(!state.has_filters());
    }

    #[test]
    fn view_mode_parses() {
        assert_eq!("LIST".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert!("tiles".parse::<ViewMode>().is_err());
    }
}
