//! Pre-wired token manager for integration tests
//!
//! Provides TestManager: a `TokenManager` over an HS256 test provider, a
//! call-counting in-memory blacklist store and a manual clock starting at
//! [`T0`].

use crate::claim_builders::TestClaimsBuilder;
use crate::crypto_fixtures::{test_hmac_provider, TEST_SECRET};
use crate::storage_fixtures::CountingStorage;
use jwt_auth::clock::{Clock, ManualClock};
use jwt_auth::config::JwtConfig;
use jwt_auth::manager::TokenManager;
use jwt_auth::provider::{JwtProvider, SigningProvider};
use jwt_auth::token::Token;
use std::sync::Arc;

/// Fixed start instant of every harness clock.
pub const T0: i64 = 1_700_000_000;

/// Configuration of the reference lifecycle scenario: issuer `"app"`, one
/// hour TTL, two week refresh window, no leeway, blacklist on with a five
/// second grace period.
pub fn scenario_config() -> JwtConfig {
    JwtConfig {
        issuer: "app".to_string(),
        ttl: Some(60),
        refresh_ttl: Some(20_160),
        leeway: 0,
        blacklist_enabled: true,
        blacklist_grace_period: 5,
        ..JwtConfig::with_secret(TEST_SECRET)
    }
}

/// Test harness around a `TokenManager`
///
/// # Example
/// ```rust,ignore
/// let harness = TestManager::new();
/// let token = harness.manager.issue("42", Map::new())?;
/// harness.advance(3601);
/// assert!(harness.manager.decode(&token, true).unwrap_err().is_expired());
/// ```
pub struct TestManager {
    pub clock: Arc<ManualClock>,
    pub storage: Arc<CountingStorage>,
    pub provider: Arc<JwtProvider>,
    pub manager: TokenManager,
}

impl TestManager {
    /// Harness over [`scenario_config`]
    pub fn new() -> Self {
        Self::with_config(&scenario_config())
    }

    /// Harness over `config`; its key material is ignored in favour of the
    /// HS256 test provider.
    pub fn with_config(config: &JwtConfig) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let storage = Arc::new(CountingStorage::new(clock.clone()));
        let provider = Arc::new(test_hmac_provider());
        let manager =
            TokenManager::from_parts(config, provider.clone(), storage.clone(), clock.clone());

        Self {
            clock,
            storage,
            provider,
            manager,
        }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn advance(&self, seconds: i64) {
        self.clock.advance(seconds);
    }

    pub fn set_time(&self, now: i64) {
        self.clock.set(now);
    }

    /// Sign raw claims with the harness provider
    pub fn mint(&self, claims: TestClaimsBuilder) -> Token {
        claims.sign(self.provider.as_ref())
    }

    /// Claims builder anchored at the current harness time
    pub fn claims(&self) -> TestClaimsBuilder {
        TestClaimsBuilder::new(self.now())
    }

    /// Raw claims carried by `token`, without any validation
    pub fn raw_claims(&self, token: &Token) -> serde_json::Map<String, serde_json::Value> {
        self.provider
            .decode(token.as_str())
            .expect("Failed to decode test token")
    }
}

impl Default for TestManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_starts_at_t0() {
        let harness = TestManager::new();
        assert_eq!(harness.now(), T0);

        harness.advance(10);
        assert_eq!(harness.now(), T0 + 10);
    }

    #[test]
    fn test_scenario_config_is_valid() {
        let config = scenario_config();
        config.validate().expect("Scenario config should validate");
        assert_eq!(config.blacklist_grace_period, 5);
    }

    #[test]
    fn test_mint_decodes_through_manager() {
        let harness = TestManager::new();
        let token = harness.mint(harness.claims());

        let payload = harness.manager.decode(&token, true).unwrap();
        assert_eq!(payload.subject(), Some("42"));
        assert_eq!(payload.jwt_id(), Some("abc"));
    }
}
