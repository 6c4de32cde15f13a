#[allow(clippy::module_inception)]
pub mod error;
pub mod fetch;

pub use error::{AppError, ErrorInfo, StorageError};
pub use fetch::{FetchError, FetchFailure, FetchFailureKind};
