//! Client-state primitives for small single-page apps: a persisted `Store`,
//! a delegating action `Dispatcher`, pure list rendering and uniform data
//! sources.

pub mod adapter;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod page;
pub mod render;
pub mod state;
pub mod storage;

pub use error::{AppError, ErrorInfo, FetchError, StorageError};
pub use page::{App, AppDispatcher, AppOutcome, Page};
pub use state::{AppState, Entity, Mutation, Store};
