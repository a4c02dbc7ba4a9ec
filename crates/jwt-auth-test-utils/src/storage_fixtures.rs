//! Instrumented storage backends
//!
//! - [`CountingStorage`] wraps an in-memory store and counts calls per
//!   operation, so tests can prove the blacklist was (or was not) consulted.
//! - [`FailingStorage`] fails every call, for error propagation tests.

use jwt_auth::clock::Clock;
use jwt_auth::storage::{InMemoryStorage, Storage, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory store that counts calls
#[derive(Debug)]
pub struct CountingStorage {
    inner: InMemoryStorage,
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
    clears: AtomicUsize,
}

impl CountingStorage {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: InMemoryStorage::new(clock),
            puts: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }

    /// Calls to `put` and `put_forever`
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl Storage for CountingStorage {
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, value, ttl_minutes)
    }

    fn put_forever(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put_forever(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}

/// Store whose every operation fails
#[derive(Debug, Default)]
pub struct FailingStorage;

impl FailingStorage {
    fn unavailable<T>() -> Result<T, StorageError> {
        Err(StorageError::Unavailable("test backend is down".to_string()))
    }
}

impl Storage for FailingStorage {
    fn put(&self, _key: &str, _value: &str, _ttl_minutes: i64) -> Result<(), StorageError> {
        Self::unavailable()
    }

    fn put_forever(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Self::unavailable()
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Self::unavailable()
    }

    fn delete(&self, _key: &str) -> Result<bool, StorageError> {
        Self::unavailable()
    }

    fn clear(&self) -> Result<(), StorageError> {
        Self::unavailable()
    }
}
