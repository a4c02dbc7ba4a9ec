use super::claim::{Claim, ClaimKind, TimeContext};
use super::{EXPIRATION, ISSUED_AT, ISSUER, JWT_ID, NOT_BEFORE, REGISTERED_CLAIMS};
use crate::clock::Clock;
use crate::error::JwtResult;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Default access-token lifetime in minutes.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Builds claims from raw values and generates default claims.
///
/// The name-to-kind table is owned by the factory. Names without an entry
/// become [`ClaimKind::Custom`]. [`ClaimFactory::extend`] adds entries for
/// this factory only; there is no process-wide registry.
#[derive(Debug, Clone)]
pub struct ClaimFactory {
    registry: HashMap<String, ClaimKind>,
    clock: Arc<dyn Clock>,
    issuer: String,
    ttl: Option<i64>,
    leeway: i64,
}

impl ClaimFactory {
    /// Factory with the registered claim names, a 60 minute TTL and no leeway.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, issuer: impl Into<String>) -> Self {
        let registry = REGISTERED_CLAIMS
            .iter()
            .filter_map(|name| {
                ClaimKind::for_registered_name(name).map(|kind| ((*name).to_string(), kind))
            })
            .collect();

        Self {
            registry,
            clock,
            issuer: issuer.into(),
            ttl: Some(DEFAULT_TTL_MINUTES),
            leeway: 0,
        }
    }

    /// Token lifetime in minutes; `None` issues tokens without `exp`.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Option<i64>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Clock skew tolerance in seconds for create-time rules.
    #[must_use]
    pub fn with_leeway(mut self, leeway: i64) -> Self {
        self.leeway = leeway;
        self
    }

    /// Map `name` to `kind`, replacing any existing entry.
    pub fn extend(&mut self, name: impl Into<String>, kind: ClaimKind) -> &mut Self {
        self.registry.insert(name.into(), kind);
        self
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> ClaimKind {
        self.registry.get(name).copied().unwrap_or(ClaimKind::Custom)
    }

    #[must_use]
    pub fn ttl(&self) -> Option<i64> {
        self.ttl
    }

    #[must_use]
    pub fn leeway(&self) -> i64 {
        self.leeway
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Current time according to the factory's clock.
    #[must_use]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Create a claim from a raw value.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::InvalidClaim` if the value breaks the create-time
    /// rules of the claim's kind.
    pub fn get(&self, name: &str, value: Value) -> JwtResult<Claim> {
        self.get_at(name, value, self.now())
    }

    /// [`ClaimFactory::get`] against an explicit `now`.
    ///
    /// # Errors
    ///
    /// See [`ClaimFactory::get`].
    pub fn get_at(&self, name: &str, value: Value, now: i64) -> JwtResult<Claim> {
        Claim::create(
            name,
            self.kind_of(name),
            value,
            TimeContext::new(now, self.leeway),
        )
    }

    /// Generate the default value for `name`.
    ///
    /// Defaults exist for `iss`, `iat`, `nbf`, `exp` (when a TTL is set) and
    /// `jti`; any other name yields `None`.
    ///
    /// # Errors
    ///
    /// Only if a generated value fails its own create-time rules, e.g. an
    /// empty configured issuer.
    pub fn make(&self, name: &str) -> JwtResult<Option<Claim>> {
        self.make_at(name, self.now())
    }

    /// [`ClaimFactory::make`] against an explicit `now`.
    ///
    /// # Errors
    ///
    /// See [`ClaimFactory::make`].
    pub fn make_at(&self, name: &str, now: i64) -> JwtResult<Option<Claim>> {
        let value = match name {
            ISSUER => Value::String(self.issuer.clone()),
            ISSUED_AT | NOT_BEFORE => Value::from(now),
            EXPIRATION => match self.ttl {
                Some(ttl) => Value::from(now.saturating_add(ttl.saturating_mul(60))),
                None => return Ok(None),
            },
            JWT_ID => Value::String(uuid::Uuid::new_v4().simple().to_string()),
            _ => return Ok(None),
        };

        self.get_at(name, value, now).map(Some)
    }
}
