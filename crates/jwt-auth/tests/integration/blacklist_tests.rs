//! Blacklist behavior through the token manager
//!
//! Grace period, permanent revocation, maintenance operations and the
//! disabled-blacklist configuration.

use jwt_auth::config::JwtConfig;
use jwt_auth::validator::ValidationMode;
use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::Map;

const REFRESH_WINDOW_SECONDS: i64 = 20_160 * 60;

// ============================================================================
// Grace Period
// ============================================================================

#[test]
fn test_invalidate_grace_period() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;
    let payload = harness.manager.decode(&token, true)?;

    assert!(harness.manager.invalidate(&token, false)?);

    harness.advance(4);
    assert!(!harness.manager.blacklist().has(&payload)?);
    assert!(harness.manager.decode(&token, true).is_ok());

    harness.advance(1);
    assert!(harness.manager.blacklist().has(&payload)?);
    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    Ok(())
}

#[test]
fn test_invalidate_twice_does_not_extend_grace() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    harness.manager.invalidate(&token, false)?;
    harness.advance(4);
    harness.manager.invalidate(&token, false)?;
    harness.advance(1);

    assert_eq!(
        harness.manager.decode(&token, true).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    Ok(())
}

#[test]
fn test_decode_without_blacklist_check() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    harness.manager.invalidate(&token, false)?;
    harness.advance(5);

    assert!(harness.manager.decode(&token, false).is_ok());
    Ok(())
}

// ============================================================================
// Forever vs TTL-bounded
// ============================================================================

#[test]
fn test_forever_outlives_refresh_window() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let bounded = harness.mint(harness.claims().with_jti("bounded"));
    let forever = harness.mint(harness.claims().with_jti("forever"));

    let bounded_payload = harness
        .manager
        .decode_as(&bounded, ValidationMode::Refresh, false)?;
    let forever_payload = harness
        .manager
        .decode_as(&forever, ValidationMode::Refresh, false)?;

    harness.manager.invalidate(&bounded, false)?;
    harness.manager.invalidate(&forever, true)?;

    harness.advance(REFRESH_WINDOW_SECONDS + 120);
    assert!(!harness.manager.blacklist().has(&bounded_payload)?);
    assert!(harness.manager.blacklist().has(&forever_payload)?);
    Ok(())
}

#[test]
fn test_revocation_outlives_leeway_extended_window() -> Result<(), anyhow::Error> {
    let harness = TestManager::with_config(&JwtConfig {
        leeway: 600,
        ..scenario_config()
    });
    let token = harness.manager.issue("42", Map::new())?;
    assert!(harness.manager.invalidate(&token, false)?);

    // Past the refresh window, but still within leeway of it
    harness.advance(REFRESH_WINDOW_SECONDS + 180);
    assert_eq!(
        harness.manager.refresh(&token, false, false).unwrap_err(),
        JwtError::TokenBlacklisted
    );

    harness.advance(600);
    assert!(harness.manager.refresh(&token, false, false).unwrap_err().is_expired());
    Ok(())
}

#[test]
fn test_invalidate_already_blacklisted_token() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    harness.manager.invalidate(&token, false)?;
    harness.advance(60);
    assert!(harness.manager.invalidate(&token, true)?);
    Ok(())
}

// ============================================================================
// Maintenance
// ============================================================================

#[test]
fn test_remove_restores_token() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;
    let payload = harness.manager.decode(&token, true)?;

    harness.manager.invalidate(&token, false)?;
    harness.advance(5);
    assert!(harness.manager.decode(&token, true).is_err());

    assert!(harness.manager.blacklist().remove(&payload)?);
    assert!(harness.manager.decode(&token, true).is_ok());
    Ok(())
}

#[test]
fn test_clear_restores_all_tokens() -> Result<(), anyhow::Error> {
    let harness = TestManager::new();
    let first = harness.manager.issue("42", Map::new())?;
    let second = harness.manager.issue("43", Map::new())?;

    harness.manager.invalidate(&first, false)?;
    harness.manager.invalidate(&second, true)?;
    harness.advance(5);

    harness.manager.blacklist().clear()?;
    assert_eq!(harness.storage.clears(), 1);
    assert!(harness.manager.check(&first));
    assert!(harness.manager.check(&second));
    Ok(())
}

// ============================================================================
// Disabled Blacklist
// ============================================================================

fn disabled_harness() -> TestManager {
    TestManager::with_config(&JwtConfig {
        blacklist_enabled: false,
        ..scenario_config()
    })
}

#[test]
fn test_disabled_blacklist_is_never_consulted() -> Result<(), anyhow::Error> {
    let harness = disabled_harness();
    let token = harness.manager.issue("42", Map::new())?;

    harness.manager.decode(&token, true)?;
    harness.manager.refresh(&token, false, false)?;

    assert_eq!(harness.storage.gets(), 0);
    assert_eq!(harness.storage.puts(), 0);
    Ok(())
}

#[test]
fn test_disabled_blacklist_rejects_invalidate() -> Result<(), anyhow::Error> {
    let harness = disabled_harness();
    let token = harness.manager.issue("42", Map::new())?;

    assert!(matches!(
        harness.manager.invalidate(&token, false),
        Err(JwtError::Configuration(_))
    ));
    assert_eq!(harness.storage.gets(), 0);
    Ok(())
}
