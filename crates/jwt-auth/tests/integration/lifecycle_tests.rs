//! End-to-end lifecycle tests
//!
//! Walks one token through issue, decode, expiry and refresh against the
//! reference scenario configuration (one hour TTL, two week refresh window,
//! five second grace period).

use jwt_auth::validator::ValidationMode;
use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::{json, Map, Value};

fn custom(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// Reference Scenario
// ============================================================================

#[test]
fn test_issue_decode_expire_refresh() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();

    // Issue at t0
    let token = harness.manager.issue("42", custom(json!({"jti": "abc"})))?;
    token.assert_valid_jwt().assert_algorithm("HS256");
    assert_eq!(
        Value::Object(harness.raw_claims(&token)),
        json!({
            "iss": "app",
            "iat": T0,
            "nbf": T0,
            "exp": T0 + 3600,
            "sub": "42",
            "jti": "abc",
        })
    );

    // Decode at t0 + 10
    harness.advance(10);
    harness
        .manager
        .decode(&token, true)?
        .assert_subject("42")
        .assert_mode(ValidationMode::Normal);

    // Decode at t0 + 3601
    harness.set_time(T0 + 3601);
    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenExpired("Token has expired".to_string())
    );

    // Refresh at t0 + 3601
    let refreshed = harness.manager.refresh(&token, false, false)?;
    harness
        .manager
        .decode(&refreshed, true)?
        .assert_subject("42")
        .assert_issued_at(T0)
        .assert_expires_at(T0 + 3601 + 3600);

    // The old token is revoked once the grace period has elapsed
    let old = harness
        .manager
        .decode_as(&token, ValidationMode::Refresh, false)?;
    assert!(!harness.manager.blacklist().has(&old)?);
    harness.advance(5);
    assert!(harness.manager.blacklist().has(&old)?);

    Ok(())
}

#[test]
fn test_refresh_with_reset_claims_moves_iat() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    harness.set_time(T0 + 3601);
    let refreshed = harness.manager.refresh(&token, false, true)?;

    harness
        .manager
        .decode(&refreshed, true)?
        .assert_issued_at(T0 + 3601)
        .assert_expires_at(T0 + 3601 + 3600);
    Ok(())
}

#[test]
fn test_check_reflects_token_state() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;
    assert!(harness.manager.check(&token));

    harness.manager.invalidate(&token, false)?;
    harness.advance(5);
    assert!(!harness.manager.check(&token));
    Ok(())
}

#[test]
fn test_token_debug_is_redacted() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    let debug_str = format!("{token:?}");
    assert!(!debug_str.contains(token.as_str()));
    assert!(debug_str.contains("[REDACTED]"));
    Ok(())
}

#[test]
fn test_missing_required_claim_is_invalid() {
    let harness = TestManager::new();
    let token = harness.mint(harness.claims().without("jti"));

    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenInvalid("JWT payload does not contain the required claims".to_string())
    );
}

#[test]
fn test_tampered_token_is_invalid() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;
    let tampered = jwt_auth::token::Token::from(format!("{}x", token.as_str()));

    assert!(matches!(
        harness.manager.decode(&tampered, true),
        Err(JwtError::TokenInvalid(_))
    ));
    Ok(())
}
