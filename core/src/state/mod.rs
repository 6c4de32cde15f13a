//! Application state: the entity contract, the state record, its persisted
//! snapshot and the `Store` that owns it.

pub mod snapshot;
pub mod store;
pub mod types;

pub use snapshot::PersistedSnapshot;
pub use store::{FetchApplied, FetchTicket, Mutation, Store};
pub use types::{
    contains_ci, matches_all, AppState, Entity, Extra, Filters, Pagination, UiFlags, ViewMode,
    DEFAULT_PAGE_SIZE,
};
