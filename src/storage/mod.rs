//! Storage backends for client state
//!
//! Session ids are persisted through the `SessionStorage` trait.
//! `SqliteStorage` keeps them across restarts; `MemoryStorage` is for tests
//! and one-shot runs.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{OpenStore, SessionStorage, StorageError, StorageResult, SESSION_ID_KEY};
