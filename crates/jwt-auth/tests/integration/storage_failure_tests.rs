//! Storage failures surface to the caller

use jwt_auth::clock::ManualClock;
use jwt_auth::config::JwtConfig;
use jwt_auth::manager::TokenManager;
use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::Map;
use std::sync::Arc;

fn failing_manager(config: &JwtConfig) -> TokenManager {
    crate::init_tracing();
    TokenManager::from_parts(
        config,
        Arc::new(test_hmac_provider()),
        Arc::new(FailingStorage),
        Arc::new(ManualClock::new(T0)),
    )
}

#[test]
fn test_decode_surfaces_storage_error() -> Result<(), anyhow::Error> {
    let manager = failing_manager(&scenario_config());
    let token = manager.issue("42", Map::new())?;

    assert!(matches!(
        manager.decode(&token, true),
        Err(JwtError::Storage(_))
    ));
    assert!(!manager.check(&token));
    Ok(())
}

#[test]
fn test_invalidate_and_refresh_surface_storage_error() -> Result<(), anyhow::Error> {
    let manager = failing_manager(&scenario_config());
    let token = manager.issue("42", Map::new())?;

    assert!(matches!(
        manager.invalidate(&token, false),
        Err(JwtError::Storage(_))
    ));
    assert!(matches!(
        manager.refresh(&token, false, false),
        Err(JwtError::Storage(_))
    ));
    Ok(())
}

#[test]
fn test_disabled_blacklist_ignores_storage() -> Result<(), anyhow::Error> {
    let manager = failing_manager(&JwtConfig {
        blacklist_enabled: false,
        ..scenario_config()
    });
    let token = manager.issue("42", Map::new())?;

    manager.decode(&token, true)?;
    manager.decode(&token, false)?;
    manager.refresh(&token, false, false)?;
    Ok(())
}
