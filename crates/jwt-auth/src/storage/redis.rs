//! Redis-backed store.
//!
//! Keys are namespaced with a prefix so that [`Storage::clear`] only removes
//! what this store wrote. The connection is synchronous and guarded by a
//! mutex; hosts that need more throughput run one store per worker.

use super::{Storage, StorageError};
use ::redis::{Client, Connection};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Default key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "jwt_auth:blacklist:";

/// Number of keys requested per `SCAN` round trip in `clear`.
const SCAN_BATCH_SIZE: usize = 500;

pub struct RedisStorage {
    connection: Mutex<Connection>,
    prefix: String,
}

/// Custom Debug implementation; the connection URL may contain credentials.
impl fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStorage")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisStorage {
    /// Connect to `redis_url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the URL does not parse or the
    /// connection fails.
    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        // The URL is never logged: it may carry a password.
        let client = Client::open(redis_url).map_err(|e| {
            tracing::error!(target: "jwt_auth.storage", error = %e, "Failed to open Redis client");
            StorageError::Unavailable(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client.get_connection().map_err(|e| {
            tracing::error!(target: "jwt_auth.storage", error = %e, "Failed to connect to Redis");
            StorageError::Unavailable(format!("Failed to connect to Redis: {e}"))
        })?;

        Ok(Self::with_connection(connection))
    }

    #[must_use]
    pub fn with_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection
            .lock()
            .map_err(|_| StorageError::Unavailable("Redis connection lock poisoned".to_string()))
    }
}

fn operation_failed(op: &'static str) -> impl FnOnce(::redis::RedisError) -> StorageError {
    move |e| {
        tracing::warn!(target: "jwt_auth.storage", operation = op, error = %e, "Redis command failed");
        StorageError::OperationFailed(format!("{op}: {e}"))
    }
}

impl Storage for RedisStorage {
    fn put(&self, key: &str, value: &str, ttl_minutes: i64) -> Result<(), StorageError> {
        let seconds = ttl_minutes.saturating_mul(60).max(1);
        let mut conn = self.lock()?;
        ::redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query::<()>(&mut *conn)
            .map_err(operation_failed("SET EX"))
    }

    fn put_forever(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        ::redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .query::<()>(&mut *conn)
            .map_err(operation_failed("SET"))
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.lock()?;
        ::redis::cmd("GET")
            .arg(self.key(key))
            .query::<Option<String>>(&mut *conn)
            .map_err(operation_failed("GET"))
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut conn = self.lock()?;
        let removed: i64 = ::redis::cmd("DEL")
            .arg(self.key(key))
            .query(&mut *conn)
            .map_err(operation_failed("DEL"))?;
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let pattern = format!("{}*", self.prefix);
        let mut conn = self.lock()?;
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query(&mut *conn)
                .map_err(operation_failed("SCAN"))?;

            if !keys.is_empty() {
                ::redis::cmd("DEL")
                    .arg(&keys)
                    .query::<()>(&mut *conn)
                    .map_err(operation_failed("DEL"))?;
            }

            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }
}
