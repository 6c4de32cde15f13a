//! Key-value persistence capability.
//!
//! Mirrors the browser's `localStorage`: string keys, string values, no
//! transactions. The store layer serialises its snapshot to JSON and writes it
//! under a single key per app.

mod file;
mod memory;

pub use file::FileKv;
pub use memory::MemoryKv;

use crate::error::StorageError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
