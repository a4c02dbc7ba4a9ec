//! Validated payloads.
//!
//! A [`Payload`] can only be obtained from
//! [`PayloadValidator::check`](crate::validator::PayloadValidator::check), so
//! every payload in circulation has passed structural and temporal validation
//! at the moment it was built. It is a read-only view afterwards.

mod factory;

pub use factory::{PayloadFactory, DEFAULT_CLAIMS};

use crate::claims::{
    Claim, ClaimCollection, ClaimValue, EXPIRATION, ISSUED_AT, JWT_ID, NOT_BEFORE, SUBJECT,
};
use crate::validator::ValidationMode;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Immutable, validated set of claims.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    claims: ClaimCollection,
    mode: ValidationMode,
}

impl Payload {
    pub(crate) fn new(claims: ClaimCollection, mode: ValidationMode) -> Self {
        Self { claims, mode }
    }

    #[must_use]
    pub fn claims(&self) -> &ClaimCollection {
        &self.claims
    }

    /// The rule set this payload was validated under.
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// JSON value of claim `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.claims.get(name).map(Claim::to_json)
    }

    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Claim> {
        self.claims.get(name)
    }

    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.claims.contains(name)
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.get(SUBJECT).and_then(|c| c.value().as_str())
    }

    #[must_use]
    pub fn jwt_id(&self) -> Option<&str> {
        match self.claims.get(JWT_ID).map(Claim::value) {
            Some(ClaimValue::JwtId(jti)) => Some(jti),
            _ => None,
        }
    }

    #[must_use]
    pub fn issued_at(&self) -> Option<i64> {
        self.timestamp(ISSUED_AT)
    }

    #[must_use]
    pub fn not_before(&self) -> Option<i64> {
        self.timestamp(NOT_BEFORE)
    }

    #[must_use]
    pub fn expiration(&self) -> Option<i64> {
        self.timestamp(EXPIRATION)
    }

    /// Claim name to JSON value, in insertion order.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.claims.to_map()
    }

    /// True if every entry of `values` is present with a loosely equal value
    /// (`"42"` matches `42`).
    #[must_use]
    pub fn matches(&self, values: &Map<String, Value>) -> bool {
        self.matches_with(values, false)
    }

    /// True if every entry of `values` is present with a JSON-equal value.
    #[must_use]
    pub fn matches_strict(&self, values: &Map<String, Value>) -> bool {
        self.matches_with(values, true)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }

    #[must_use]
    pub fn into_claims(self) -> ClaimCollection {
        self.claims
    }

    fn timestamp(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(|c| c.value().as_timestamp())
    }

    fn matches_with(&self, values: &Map<String, Value>, strict: bool) -> bool {
        !values.is_empty()
            && values.iter().all(|(name, expected)| {
                self.claims
                    .get(name)
                    .is_some_and(|claim| claim.matches(expected, strict))
            })
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}
