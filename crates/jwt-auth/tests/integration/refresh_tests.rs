//! Refresh flow tests
//!
//! Covers the refresh window anchored at `iat`, persistent claims and the
//! revocation of the exchanged token.

use jwt_auth::manager::RefreshOptions;
use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::{json, Map, Value};

const REFRESH_WINDOW_SECONDS: i64 = 20_160 * 60;

fn custom(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Refresh Window
// ============================================================================

#[test]
fn test_refresh_fails_after_window() {
    let harness = TestManager::new();
    let iat = T0 - REFRESH_WINDOW_SECONDS - 1;
    let token = harness.mint(
        harness
            .claims()
            .issued_at(iat)
            .not_before(iat)
            .expires_at(iat + 3600),
    );

    assert_eq!(
        harness.manager.refresh(&token, false, false).unwrap_err(),
        JwtError::TokenExpired("Token has expired and can no longer be refreshed".to_string())
    );
}

#[test]
fn test_refresh_succeeds_inside_window_after_expiry() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let iat = T0 - REFRESH_WINDOW_SECONDS + 1;
    let token = harness.mint(
        harness
            .claims()
            .issued_at(iat)
            .not_before(iat)
            .expires_at(iat + 3600),
    );

    assert!(harness.manager.decode(&token, true).unwrap_err().is_expired());

    let refreshed = harness.manager.refresh(&token, false, false)?;
    harness
        .manager
        .decode(&refreshed, true)?
        .assert_issued_at(iat)
        .assert_expires_at(T0 + 3600);
    Ok(())
}

#[test]
fn test_unbounded_refresh_window() -> Result<(), anyhow::Error> {
    let config = jwt_auth::config::JwtConfig {
        refresh_ttl: None,
        ..scenario_config()
    };
    let harness = TestManager::with_config(&config);
    let iat = T0 - 10 * REFRESH_WINDOW_SECONDS;
    let token = harness.mint(
        harness
            .claims()
            .issued_at(iat)
            .not_before(iat)
            .expires_at(iat + 3600),
    );

    let refreshed = harness.manager.refresh(&token, false, false)?;
    harness.manager.decode(&refreshed, true)?.assert_issued_at(iat);
    Ok(())
}

// ============================================================================
// Claims Carried Forward
// ============================================================================

#[test]
fn test_persistent_claims_survive_refresh() -> Result<(), anyhow::Error> {
    let config = jwt_auth::config::JwtConfig {
        persistent_claims: vec!["role".to_string()],
        ..scenario_config()
    };
    let harness = TestManager::with_config(&config);
    let token = harness
        .manager
        .issue("42", custom(json!({"role": "admin", "scope": "read"})))?;

    harness.advance(60);
    let refreshed = harness.manager.refresh(&token, false, false)?;

    harness
        .manager
        .decode(&refreshed, true)?
        .assert_subject("42")
        .assert_issued_at(T0)
        .assert_claim("role", json!("admin"))
        .assert_lacks("scope");
    Ok(())
}

#[test]
fn test_custom_claims_can_be_resupplied() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness
        .manager
        .issue("42", custom(json!({"scope": "read"})))?;

    let refreshed = harness.manager.refresh_with(
        &token,
        RefreshOptions {
            custom_claims: custom(json!({"scope": "write"})),
            ..RefreshOptions::default()
        },
    )?;

    harness
        .manager
        .decode(&refreshed, true)?
        .assert_claim("scope", json!("write"));
    Ok(())
}

#[test]
fn test_refreshed_token_gets_new_jti() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.mint(harness.claims());
    let refreshed = harness.manager.refresh(&token, false, false)?;

    let jti = harness.raw_claims(&refreshed).get("jti").cloned();
    assert!(jti.is_some());
    assert_ne!(jti, Some(json!("abc")));
    Ok(())
}

// ============================================================================
// Revocation of the Old Token
// ============================================================================

#[test]
fn test_old_token_rejected_after_grace() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;
    harness.manager.refresh(&token, false, false)?;

    // Still inside the grace window
    harness.advance(4);
    assert!(harness.manager.decode(&token, true).is_ok());

    harness.advance(1);
    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    assert_eq!(
        harness.manager.refresh(&token, false, false).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    Ok(())
}

#[test]
fn test_refresh_without_jti_does_not_revoke_new_token() -> Result<(), anyhow::Error> {
    let config = jwt_auth::config::JwtConfig {
        required_claims: ["iss", "iat", "exp", "nbf", "sub"].map(String::from).to_vec(),
        ..scenario_config()
    };
    let mut harness = TestManager::with_config(&config);
    let factory = harness
        .manager
        .payload_factory()
        .clone()
        .with_default_claims(["iss", "iat", "exp", "nbf"]);
    *harness.manager.payload_factory_mut() = factory;

    let token = harness.manager.issue("42", Map::new())?;
    harness.advance(60);
    let refreshed = harness.manager.refresh(&token, false, false)?;

    harness.advance(5);
    let payload = harness.manager.decode(&refreshed, true)?;
    payload.assert_subject("42").assert_issued_at(T0).assert_lacks("jti");
    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    Ok(())
}

#[test]
fn test_refresh_without_blacklist_leaves_old_token_valid() -> Result<(), anyhow::Error> {
    let config = jwt_auth::config::JwtConfig {
        blacklist_enabled: false,
        ..scenario_config()
    };
    let harness = TestManager::with_config(&config);
    let token = harness.manager.issue("42", Map::new())?;

    harness.manager.refresh(&token, false, false)?;
    harness.advance(60);

    assert!(harness.manager.decode(&token, true).is_ok());
    assert_eq!(harness.storage.puts(), 0);
    Ok(())
}
