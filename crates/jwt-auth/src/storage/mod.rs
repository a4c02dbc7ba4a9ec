//! Key-value store seam used by the blacklist.
//!
//! The store is the only shared mutable state in the crate. Implementations
//! must be safe under concurrent calls and give read-after-write consistency
//! for a single key.
//!
//! - [`InMemoryStorage`] - process-local map with lazy expiry
//! - `RedisStorage` - shared store, behind the `redis` feature

mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::InMemoryStorage;
#[cfg(feature = "redis")]
pub use self::redis::RedisStorage;

use crate::error::JwtError;
use thiserror::Error;

/// Failures of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation failed: {0}")]
    OperationFailed(String),
}

impl From<StorageError> for JwtError {
    fn from(err: StorageError) -> Self {
        JwtError::Storage(err.to_string())
    }
}

/// Minimal key-value contract the blacklist needs.
///
/// A missing key is `Ok(None)`, never an error.
pub trait Storage: Send + Sync {
    /// Store `value` under `key` for `ttl_minutes`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) -> Result<(), StorageError>;

    /// Store `value` under `key` without expiry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn put_forever(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove `key`. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Remove every key owned by this store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    fn clear(&self) -> Result<(), StorageError>;
}
