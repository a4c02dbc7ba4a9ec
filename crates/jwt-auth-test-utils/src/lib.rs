//! # jwt-auth Test Utilities
//!
//! Shared test utilities for the `jwt-auth` crate.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed secrets and Ed25519 keys)
//! - Claim-map builders for minting tokens with arbitrary claims
//! - Instrumented storage (call counting, always failing)
//! - A pre-wired manager harness driven by a manual clock
//! - Custom assertions (PayloadAssertions, TokenAssertions traits)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwt_auth_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let harness = TestManager::new();
//!     let token = harness.manager.issue("42", serde_json::Map::new()).unwrap();
//!
//!     harness.advance(10);
//!     harness
//!         .manager
//!         .decode(&token, true)
//!         .unwrap()
//!         .assert_subject("42")
//!         .assert_issued_at(T0);
//! }
//! ```

pub mod assertions;
pub mod claim_builders;
pub mod crypto_fixtures;
pub mod manager_harness;
pub mod storage_fixtures;

// Re-export commonly used items
pub use assertions::*;
pub use claim_builders::*;
pub use crypto_fixtures::*;
pub use manager_harness::*;
pub use storage_fixtures::*;
