//! Encode/decode round trips through real providers

use jwt_auth::clock::ManualClock;
use jwt_auth::config::JwtConfig;
use jwt_auth::manager::TokenManager;
use jwt_auth::provider::Algorithm;
use jwt_auth::storage::InMemoryStorage;
use jwt_auth_test_utils::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn custom(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_decode_encode_preserves_claims() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let samples = [
        json!({"sub": "42"}),
        json!({"sub": "42", "aud": ["web", "mobile"], "role": "admin"}),
        json!({"sub": "42", "flags": {"beta": true}, "quota": 12.5, "tags": [1, "two", null]}),
    ];

    for sample in samples {
        let payload = harness.manager.payload_factory().make(&custom(sample), false)?;
        let token = harness.manager.encode(&payload)?;
        let decoded = harness.manager.decode(&token, true)?;

        assert_eq!(decoded.to_map(), payload.to_map());
    }
    Ok(())
}

#[test]
fn test_numeric_subject_is_stringified() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.mint(harness.claims().with_claim("sub", json!(42)));

    harness.manager.decode(&token, true)?.assert_subject("42");
    Ok(())
}

#[test]
fn test_payload_matches_loose_and_strict() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness
        .manager
        .issue("42", custom(json!({"level": 3})))?;
    let payload = harness.manager.decode(&token, true)?;

    assert!(payload.matches(&custom(json!({"sub": "42", "level": "3"}))));
    assert!(!payload.matches_strict(&custom(json!({"level": "3"}))));
    assert!(payload.matches_strict(&custom(json!({"level": 3}))));
    Ok(())
}

#[test]
fn test_ed25519_manager_round_trip() -> Result<(), anyhow::Error> {
    let clock = Arc::new(ManualClock::new(T0));
    let manager = TokenManager::from_parts(
        &scenario_config(),
        Arc::new(test_ed25519_provider(7)),
        Arc::new(InMemoryStorage::new(clock.clone())),
        clock,
    );

    let token = manager.issue("42", Map::new())?;
    token.assert_valid_jwt().assert_algorithm("EdDSA");
    manager.decode(&token, true)?.assert_subject("42");

    let other = TokenManager::from_parts(
        &scenario_config(),
        Arc::new(test_ed25519_provider(8)),
        Arc::new(InMemoryStorage::default()),
        Arc::new(ManualClock::new(T0)),
    );
    assert!(other.decode(&token, true).is_err());
    Ok(())
}

#[test]
fn test_manager_from_config_uses_configured_algorithm() -> Result<(), anyhow::Error> {
    let config = JwtConfig {
        algorithm: Algorithm::HS384,
        ..JwtConfig::with_secret(TEST_SECRET)
    };
    let clock = Arc::new(ManualClock::new(T0));
    let manager = TokenManager::from_config_with_clock(
        &config,
        Arc::new(InMemoryStorage::new(clock.clone())),
        clock,
    )?;

    let token = manager.issue("42", Map::new())?;
    token.assert_algorithm("HS384");
    manager
        .decode(&token, true)?
        .assert_claim("iss", json!("jwt-auth"));
    Ok(())
}
