//! Builder patterns for test claim maps
//!
//! Mints tokens with arbitrary, possibly invalid, claims by signing a raw map
//! directly with a provider. Useful for exercising decode paths that a
//! `TokenManager` would never produce itself.

use jwt_auth::provider::SigningProvider;
use jwt_auth::token::Token;
use serde_json::{Map, Value};

/// Builder for raw claim maps
///
/// Defaults describe a token issued at `now` for subject `"42"` with
/// `jti = "abc"`, issuer `"app"` and a one hour lifetime.
///
/// # Example
/// ```rust,ignore
/// let token = TestClaimsBuilder::new(T0)
///     .expires_at(T0 - 1)
///     .with_claim("role", json!("admin"))
///     .sign(&test_hmac_provider());
/// ```
pub struct TestClaimsBuilder {
    claims: Map<String, Value>,
}

impl TestClaimsBuilder {
    /// Create a new claims builder with defaults
    pub fn new(now: i64) -> Self {
        let mut claims = Map::new();
        claims.insert("iss".to_string(), Value::from("app"));
        claims.insert("iat".to_string(), Value::from(now));
        claims.insert("nbf".to_string(), Value::from(now));
        claims.insert("exp".to_string(), Value::from(now + 3600));
        claims.insert("sub".to_string(), Value::from("42"));
        claims.insert("jti".to_string(), Value::from("abc"));
        Self { claims }
    }

    pub fn for_subject(self, subject: &str) -> Self {
        self.with_claim("sub", Value::from(subject))
    }

    pub fn with_jti(self, jti: &str) -> Self {
        self.with_claim("jti", Value::from(jti))
    }

    pub fn issued_at(self, timestamp: i64) -> Self {
        self.with_claim("iat", Value::from(timestamp))
    }

    pub fn not_before(self, timestamp: i64) -> Self {
        self.with_claim("nbf", Value::from(timestamp))
    }

    pub fn expires_at(self, timestamp: i64) -> Self {
        self.with_claim("exp", Value::from(timestamp))
    }

    /// Set any claim, replacing an existing value
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Drop a claim, e.g. to test required-claim checks
    pub fn without(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    pub fn build(self) -> Map<String, Value> {
        self.claims
    }

    /// Sign the claims with `provider`, bypassing all validation
    pub fn sign(self, provider: &dyn SigningProvider) -> Token {
        let token = provider
            .encode(&self.claims)
            .expect("Failed to sign test claims");
        Token::from(token)
    }
}
