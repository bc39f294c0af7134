//! Storage trait definitions

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key under which the activity session id is persisted
pub const SESSION_ID_KEY: &str = "scent_session_id";

/// Small string key/value store for client state that outlives a process
///
/// Implementations must be thread-safe (Send + Sync); the session scorer
/// shares one across its tasks.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key; returns whether it was present
    fn remove(&self, key: &str) -> StorageResult<bool>;
}

/// Trait for storage backends that can be opened from a path
pub trait OpenStore: SessionStorage + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
