//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for payloads and tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jwt_auth::payload::Payload;
use jwt_auth::token::Token;
use jwt_auth::validator::ValidationMode;
use serde::Deserialize;
use serde_json::Value;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Custom assertions for decoded payloads
///
/// # Example
/// ```rust,ignore
/// payload
///     .assert_subject("42")
///     .assert_issued_at(T0)
///     .assert_lacks("role");
/// ```
pub trait PayloadAssertions {
    fn assert_subject(&self, subject: &str) -> &Self;

    fn assert_claim(&self, name: &str, value: Value) -> &Self;

    /// Assert that the claim is absent
    fn assert_lacks(&self, name: &str) -> &Self;

    fn assert_issued_at(&self, timestamp: i64) -> &Self;

    fn assert_expires_at(&self, timestamp: i64) -> &Self;

    fn assert_mode(&self, mode: ValidationMode) -> &Self;
}

impl PayloadAssertions for Payload {
    fn assert_subject(&self, subject: &str) -> &Self {
        assert_eq!(
            self.subject(),
            Some(subject),
            "Expected subject '{}'",
            subject
        );
        self
    }

    fn assert_claim(&self, name: &str, value: Value) -> &Self {
        assert_eq!(
            self.get(name),
            Some(value),
            "Unexpected value for claim '{}'",
            name
        );
        self
    }

    fn assert_lacks(&self, name: &str) -> &Self {
        assert!(
            !self.has_key(name),
            "Expected claim '{}' to be absent, got {:?}",
            name,
            self.get(name)
        );
        self
    }

    fn assert_issued_at(&self, timestamp: i64) -> &Self {
        assert_eq!(self.issued_at(), Some(timestamp), "Unexpected iat");
        self
    }

    fn assert_expires_at(&self, timestamp: i64) -> &Self {
        assert_eq!(self.expiration(), Some(timestamp), "Unexpected exp");
        self
    }

    fn assert_mode(&self, mode: ValidationMode) -> &Self {
        assert_eq!(self.mode(), mode, "Unexpected validation mode");
        self
    }
}

/// Custom assertions for signed tokens
pub trait TokenAssertions {
    /// Assert that the token is a compact JWT (header.payload.signature)
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the `alg` header
    fn assert_algorithm(&self, alg: &str) -> &Self;
}

fn header(token: &str) -> JwtHeader {
    let encoded = token.split('.').next().expect("Token has no header");
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .expect("Failed to base64 decode JWT header");
    serde_json::from_slice(&bytes).expect("Failed to parse JWT header JSON")
}

impl TokenAssertions for Token {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.as_str().split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = header(self.as_str());
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .expect("Failed to base64 decode JWT payload");
        let claims: Result<serde_json::Map<String, Value>, _> = serde_json::from_slice(&payload);
        assert!(
            claims.is_ok(),
            "Failed to parse JWT claims JSON: {:?}",
            claims.err()
        );

        self
    }

    fn assert_algorithm(&self, alg: &str) -> &Self {
        let header = header(self.as_str());
        assert_eq!(header.alg, alg, "Unexpected JWT algorithm");
        self
    }
}
