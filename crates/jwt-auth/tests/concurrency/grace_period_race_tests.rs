//! Concurrent refreshes of the same token
//!
//! A client rotating its token on every request can race several requests
//! carrying the same pre-rotation token. Inside the grace period all of them
//! must succeed; afterwards the old token is rejected.

use jwt_auth::JwtError;
use jwt_auth_test_utils::*;
use serde_json::Map;
use std::collections::HashSet;
use std::thread;

const WORKERS: usize = 8;

#[test]
fn test_concurrent_refresh_within_grace() -> Result<(), anyhow::Error> {
    crate::init_tracing();
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| scope.spawn(|| harness.manager.refresh(&token, false, false)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    let mut jtis = HashSet::new();
    for result in results {
        let refreshed = result?;
        let payload = harness.manager.decode(&refreshed, true)?;
        payload.assert_subject("42").assert_issued_at(T0);
        jtis.insert(payload.jwt_id().map(ToString::to_string));
    }
    assert_eq!(jtis.len(), WORKERS, "every refresh should mint a distinct token");

    harness.advance(5);
    assert_eq!(
        harness.manager.refresh(&token, false, false).unwrap_err(),
        JwtError::TokenBlacklisted
    );
    Ok(())
}

#[test]
fn test_concurrent_decode_during_revocation() -> Result<(), anyhow::Error> {
    crate::init_tracing();
    let harness = TestManager::new();
    let token = harness.manager.issue("42", Map::new())?;

    thread::scope(|scope| {
        scope.spawn(|| {
            assert!(harness.manager.invalidate(&token, false).unwrap());
        });
        for _ in 0..WORKERS {
            scope.spawn(|| {
                assert!(harness.manager.decode(&token, true).is_ok());
            });
        }
    });

    harness.advance(5);
    assert!(!harness.manager.check(&token));
    Ok(())
}
