//! Temporal boundary and leeway tests

use jwt_auth::claims::{ClaimFactory, ISSUED_AT};
use jwt_auth::clock::ManualClock;
use jwt_auth::config::JwtConfig;
use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::json;
use std::sync::Arc;

fn harness_with_leeway(leeway: i64) -> TestManager {
    TestManager::with_config(&JwtConfig {
        leeway,
        ..scenario_config()
    })
}

// ============================================================================
// Expiration Boundary (no leeway)
// ============================================================================

#[test]
fn test_exp_boundary_without_leeway() {
    let harness = harness_with_leeway(0);

    let expired = harness.mint(harness.claims().expires_at(T0 - 1));
    assert!(harness
        .manager
        .decode(&expired, true)
        .unwrap_err()
        .is_expired());

    let valid = harness.mint(harness.claims().expires_at(T0 + 1));
    assert!(harness.manager.decode(&valid, true).is_ok());
}

#[test]
fn test_future_nbf_is_invalid() {
    let harness = harness_with_leeway(0);
    let token = harness.mint(harness.claims().not_before(T0 + 1));

    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenInvalid("Not Before (nbf) timestamp cannot be in the future".to_string())
    );
}

#[test]
fn test_future_iat_is_invalid_on_decode() {
    let harness = harness_with_leeway(0);
    let token = harness.mint(harness.claims().issued_at(T0 + 3600));

    assert!(matches!(
        harness.manager.decode(&token, true),
        Err(JwtError::TokenInvalid(_))
    ));
}

#[test]
fn test_future_iat_rejected_at_construction() {
    let factory = ClaimFactory::new(Arc::new(ManualClock::new(T0)), "app");
    let result = factory.get(ISSUED_AT, json!(T0 + 3600));

    assert_eq!(
        result.unwrap_err(),
        JwtError::InvalidClaim {
            name: "iat".to_string()
        }
    );
}

// ============================================================================
// Leeway Absorption
// ============================================================================

#[test]
fn test_leeway_absorbs_recent_expiry() {
    let harness = harness_with_leeway(10);

    let within = harness.mint(harness.claims().expires_at(T0 - 5));
    assert!(harness.manager.decode(&within, true).is_ok());

    let beyond = harness.mint(harness.claims().expires_at(T0 - 15));
    assert!(harness
        .manager
        .decode(&beyond, true)
        .unwrap_err()
        .is_expired());
}

#[test]
fn test_leeway_absorbs_clock_skew_on_nbf_and_iat() {
    let harness = harness_with_leeway(10);

    let within = harness.mint(harness.claims().issued_at(T0 + 5).not_before(T0 + 5));
    assert!(harness.manager.decode(&within, true).is_ok());

    let beyond = harness.mint(harness.claims().not_before(T0 + 15));
    assert!(matches!(
        harness.manager.decode(&beyond, true),
        Err(JwtError::TokenInvalid(_))
    ));
}

#[test]
fn test_leeway_extends_refresh_window() -> Result<(), anyhow::Error> {
    let harness = harness_with_leeway(10);
    let iat = T0 - 20_160 * 60 - 5;
    let token = harness.mint(
        harness
            .claims()
            .issued_at(iat)
            .not_before(iat)
            .expires_at(iat + 3600),
    );

    harness.manager.refresh(&token, false, false)?;
    Ok(())
}
