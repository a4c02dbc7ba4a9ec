//! Revocation list with grace-period semantics.
//!
//! An entry records the instant until which a revoked token is still
//! tolerated (`valid_until = revoked_at + grace_period`). [`Blacklist::has`]
//! reports a payload as revoked once that instant is reached. The grace
//! window lets concurrent requests that still carry the pre-rotation token
//! succeed for a few seconds after a refresh.
//!
//! # Revocation key
//!
//! Entries are keyed by the `jti` claim. A payload without `jti` is keyed by
//! a SHA-256 fingerprint of its full claim set with object keys sorted. A
//! refresh keeps `sub` and `iat` but issues new `exp` and `nbf` values, so
//! the replacement token does not inherit the revoked token's entry. Only
//! byte-identical claim sets share a key.
//!
//! # Storage lifetime
//!
//! A TTL-bounded entry is kept until the token can no longer be used or
//! refreshed (`max(exp, iat + refresh_ttl)`), extended by the validation
//! leeway, plus one minute. Entries for tokens without `exp`, or added while
//! the refresh window is unbounded, never expire.

use crate::clock::Clock;
use crate::error::JwtResult;
use crate::payload::Payload;
use crate::storage::Storage;
use crate::validator::DEFAULT_REFRESH_TTL_MINUTES;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stored value of a blacklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    /// Unix seconds until which the token is still accepted.
    pub valid_until: i64,
    #[serde(default)]
    pub forever: bool,
}

/// Tracks revoked tokens in a [`Storage`] backend.
#[derive(Clone)]
pub struct Blacklist {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    /// Seconds.
    grace_period: i64,
    /// Minutes; `None` is an unbounded refresh window.
    refresh_ttl: Option<i64>,
    /// Seconds the validator tolerates past `exp` and the refresh window.
    leeway: i64,
}

impl fmt::Debug for Blacklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blacklist")
            .field("grace_period", &self.grace_period)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl Blacklist {
    /// Blacklist with no grace period and the default refresh window.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            grace_period: 0,
            refresh_ttl: Some(DEFAULT_REFRESH_TTL_MINUTES),
            leeway: 0,
        }
    }

    #[must_use]
    pub fn with_grace_period(mut self, seconds: i64) -> Self {
        self.set_grace_period(seconds);
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, minutes: Option<i64>) -> Self {
        self.set_refresh_ttl(minutes);
        self
    }

    /// Must match the leeway of the validator guarding the same tokens.
    #[must_use]
    pub fn with_leeway(mut self, seconds: i64) -> Self {
        self.set_leeway(seconds);
        self
    }

    /// Applies to entries added after the call. Negative values count as 0.
    pub fn set_leeway(&mut self, seconds: i64) -> &mut Self {
        self.leeway = seconds.max(0);
        self
    }

    /// Applies to entries added after the call. Negative values count as 0.
    pub fn set_grace_period(&mut self, seconds: i64) -> &mut Self {
        self.grace_period = seconds.max(0);
        self
    }

    /// Applies to entries added after the call.
    pub fn set_refresh_ttl(&mut self, minutes: Option<i64>) -> &mut Self {
        self.refresh_ttl = minutes;
        self
    }

    #[must_use]
    pub fn grace_period(&self) -> i64 {
        self.grace_period
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Option<i64> {
        self.refresh_ttl
    }

    #[must_use]
    pub fn leeway(&self) -> i64 {
        self.leeway
    }

    /// Revoke `payload` until it can no longer be used or refreshed.
    ///
    /// Falls back to [`Blacklist::add_forever`] when the payload has no
    /// `exp` or the refresh window is unbounded. Re-adding a revoked payload
    /// is a no-op: the original grace window is not extended.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Storage` if the backend fails.
    pub fn add(&self, payload: &Payload) -> JwtResult<bool> {
        let (Some(exp), Some(refresh_ttl)) = (payload.expiration(), self.refresh_ttl) else {
            return self.add_forever(payload);
        };

        let key = revocation_key(payload);
        if self.storage.get(&key)?.is_some() {
            tracing::debug!(target: "jwt_auth.blacklist", "Token already blacklisted");
            return Ok(true);
        }

        let now = self.clock.now();
        let refresh_until = payload
            .issued_at()
            .map_or(exp, |iat| iat.saturating_add(refresh_ttl.saturating_mul(60)));
        let until = exp.max(refresh_until).saturating_add(self.leeway);
        let ttl_minutes = minutes_until(now, until).saturating_add(1);

        let entry = BlacklistEntry {
            valid_until: now.saturating_add(self.grace_period),
            forever: false,
        };
        self.storage.put(&key, &encode_entry(entry), ttl_minutes)?;

        tracing::info!(
            target: "jwt_auth.blacklist",
            valid_until = entry.valid_until,
            ttl_minutes = ttl_minutes,
            "Token blacklisted"
        );
        Ok(true)
    }

    /// Revoke `payload` permanently.
    ///
    /// The grace window of an existing entry is kept; otherwise it starts
    /// now.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Storage` if the backend fails.
    pub fn add_forever(&self, payload: &Payload) -> JwtResult<bool> {
        let key = revocation_key(payload);
        let valid_until = match self.storage.get(&key)?.as_deref().and_then(decode_entry) {
            Some(existing) => existing.valid_until,
            None => self.clock.now().saturating_add(self.grace_period),
        };

        let entry = BlacklistEntry {
            valid_until,
            forever: true,
        };
        self.storage.put_forever(&key, &encode_entry(entry))?;

        tracing::info!(
            target: "jwt_auth.blacklist",
            valid_until = valid_until,
            "Token blacklisted permanently"
        );
        Ok(true)
    }

    /// Whether `payload` is revoked and outside its grace window.
    ///
    /// An entry that cannot be read back is treated as revoked.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Storage` if the backend fails.
    pub fn has(&self, payload: &Payload) -> JwtResult<bool> {
        let Some(raw) = self.storage.get(&revocation_key(payload))? else {
            return Ok(false);
        };

        let Some(entry) = decode_entry(&raw) else {
            tracing::warn!(
                target: "jwt_auth.blacklist",
                "Unreadable blacklist entry, treating token as revoked"
            );
            return Ok(true);
        };

        Ok(entry.valid_until <= self.clock.now())
    }

    /// Un-revoke `payload`. Returns whether an entry existed.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Storage` if the backend fails.
    pub fn remove(&self, payload: &Payload) -> JwtResult<bool> {
        let removed = self.storage.delete(&revocation_key(payload))?;
        if removed {
            tracing::info!(target: "jwt_auth.blacklist", "Token removed from blacklist");
        }
        Ok(removed)
    }

    /// Drop every entry.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Storage` if the backend fails.
    pub fn clear(&self) -> JwtResult<bool> {
        self.storage.clear()?;
        tracing::info!(target: "jwt_auth.blacklist", "Blacklist cleared");
        Ok(true)
    }
}

/// Storage key for `payload`: its `jti`, or a fingerprint of every claim
/// when absent.
#[must_use]
pub fn revocation_key(payload: &Payload) -> String {
    if let Some(jti) = payload.jwt_id() {
        return jti.to_string();
    }

    let claims = canonical(&Value::Object(payload.to_map()));
    let digest = Sha256::digest(claims.to_string().as_bytes());
    format!("fp:{}", hex::encode(digest))
}

/// `value` with object keys sorted at every level.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

fn minutes_until(now: i64, until: i64) -> i64 {
    until.saturating_sub(now).max(0).saturating_add(59) / 60
}

fn encode_entry(entry: BlacklistEntry) -> String {
    serde_json::json!({
        "valid_until": entry.valid_until,
        "forever": entry.forever,
    })
    .to_string()
}

fn decode_entry(raw: &str) -> Option<BlacklistEntry> {
    serde_json::from_str(raw).ok()
}
