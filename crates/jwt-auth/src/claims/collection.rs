use super::claim::{Claim, TimeContext};
use crate::error::JwtResult;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Ordered, name-keyed set of claims.
///
/// Names are unique: inserting a claim under an existing name replaces the
/// old claim in place. Insertion order carries no meaning but is kept so the
/// serialized claim map is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimCollection {
    claims: IndexMap<String, Claim>,
}

impl ClaimCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a claim, returning the claim it replaced.
    pub fn insert(&mut self, claim: Claim) -> Option<Claim> {
        self.claims.insert(claim.name().to_string(), claim)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Claim> {
        self.claims.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// True if every name in `names` is present.
    #[must_use]
    pub fn has_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.contains(name.as_ref()))
    }

    /// Names from `names` that are absent, in the given order.
    #[must_use]
    pub fn missing<'a, S: AsRef<str>>(&self, names: &'a [S]) -> Vec<&'a str> {
        names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.contains(name))
            .collect()
    }

    /// First claim whose value equals `value` (strict JSON equality).
    #[must_use]
    pub fn find_by_value(&self, value: &Value) -> Option<&Claim> {
        self.claims.values().find(|claim| claim.matches(value, true))
    }

    pub fn remove(&mut self, name: &str) -> Option<Claim> {
        self.claims.shift_remove(name)
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
        self.claims.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.claims.keys().map(String::as_str)
    }

    /// Claim name to JSON value, in insertion order.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.claims
            .iter()
            .map(|(name, claim)| (name.clone(), claim.to_json()))
            .collect()
    }

    /// Run payload-time rules on every claim; the first failure wins.
    ///
    /// # Errors
    ///
    /// Propagates the first `TokenInvalid` / `TokenExpired` raised by a claim.
    pub fn validate_payload(&self, time: TimeContext) -> JwtResult<()> {
        self.iter().try_for_each(|claim| claim.validate_payload(time))
    }

    /// Run refresh-flow rules on every claim; the first failure wins.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` if the refresh window has elapsed.
    pub fn validate_refresh(&self, time: TimeContext, refresh_ttl_minutes: i64) -> JwtResult<()> {
        self.iter()
            .try_for_each(|claim| claim.validate_refresh(time, refresh_ttl_minutes))
    }
}

impl FromIterator<Claim> for ClaimCollection {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        let mut collection = Self::new();
        for claim in iter {
            collection.insert(claim);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a ClaimCollection {
    type Item = &'a Claim;
    type IntoIter = indexmap::map::Values<'a, String, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.values()
    }
}
