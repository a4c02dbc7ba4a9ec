use super::{Storage, StorageError};
use crate::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// Unix seconds; `None` never expires.
    expires_at: Option<i64>,
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<String, Entry>,
    /// Earliest `expires_at` among stored entries, possibly stale after a
    /// delete. A write at or after this instant sweeps the map.
    next_expiry: Option<i64>,
}

impl Entries {
    fn sweep(&mut self, now: i64) {
        let before = self.map.len();
        self.map
            .retain(|_, entry| entry.expires_at.map_or(true, |at| at > now));
        self.next_expiry = self.map.values().filter_map(|entry| entry.expires_at).min();

        tracing::debug!(
            target: "jwt_auth.storage",
            removed = before - self.map.len(),
            remaining = self.map.len(),
            "Swept expired entries"
        );
    }
}

/// Process-local store.
///
/// A read drops the expired entry it finds. A write sweeps every expired
/// entry once the earliest known expiry has passed, so revoked tokens that
/// are never read again do not accumulate. Suitable for single-process hosts
/// and tests; multi-instance deployments need a shared backend.
#[derive(Debug)]
pub struct InMemoryStorage {
    entries: Mutex<Entries>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryStorage {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.map.len())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.lock()?.map.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, StorageError> {
        self.entries.lock().map_err(|_| {
            tracing::warn!(target: "jwt_auth.storage", "In-memory storage lock poisoned");
            StorageError::Unavailable("lock poisoned".to_string())
        })
    }

    fn insert(
        &self,
        key: &str,
        value: &str,
        expires_at: Option<i64>,
        now: i64,
    ) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        if entries.next_expiry.is_some_and(|at| at <= now) {
            entries.sweep(now);
        }

        entries.map.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        if let Some(at) = expires_at {
            entries.next_expiry = Some(entries.next_expiry.map_or(at, |next| next.min(at)));
        }
        Ok(())
    }
}

impl Storage for InMemoryStorage {
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) -> Result<(), StorageError> {
        let now = self.clock.now();
        let expires_at = now.saturating_add(ttl_minutes.saturating_mul(60));
        self.insert(key, value, Some(expires_at), now)
    }

    fn put_forever(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value, None, self.clock.now())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let now = self.clock.now();
        let mut entries = self.lock()?;

        let expired = entries
            .map
            .get(key)
            .is_some_and(|entry| entry.expires_at.is_some_and(|at| at <= now));
        if expired {
            entries.map.remove(key);
            return Ok(None);
        }

        Ok(entries.map.get(key).map(|entry| entry.value.clone()))
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock()?.map.remove(key).is_some())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        entries.map.clear();
        entries.next_expiry = None;
        Ok(())
    }
}
