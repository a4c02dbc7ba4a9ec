//! Token lifecycle engine: issue, validate, refresh and revoke signed tokens.
//!
//! The crate is synchronous and has no internal threading. Hosts call it per
//! request; the only shared mutable state lives in the blacklist [`storage`]
//! backend.
//!
//! # Modules
//!
//! - `claims` - Typed claims, the claim collection and the claim factory
//! - `validator` - Structural and temporal payload validation
//! - `payload` - Validated payloads and the payload factory
//! - `token` - Opaque signed token wrapper
//! - `provider` - Signing provider seam and the `jsonwebtoken` implementation
//! - `storage` - Key-value store seam used by the blacklist
//! - `blacklist` - Revocation list with grace-period semantics
//! - `manager` - Orchestration of encode, decode, refresh and invalidate
//!
//! # Usage
//!
//! ```rust,ignore
//! use jwt_auth::config::JwtConfig;
//! use jwt_auth::manager::TokenManager;
//! use jwt_auth::storage::InMemoryStorage;
//! use std::sync::Arc;
//!
//! let config = JwtConfig::from_env()?;
//! let manager = TokenManager::from_config(&config, Arc::new(InMemoryStorage::default()))?;
//!
//! let token = manager.issue("42", serde_json::Map::new())?;
//! let payload = manager.decode(&token, true)?;
//! let refreshed = manager.refresh(&token, false, false)?;
//! ```

#![warn(clippy::pedantic)]

pub mod blacklist;
pub mod claims;
pub mod clock;
pub mod config;
pub mod error;
pub mod manager;
pub mod payload;
pub mod provider;
pub mod secret;
pub mod storage;
pub mod token;
pub mod validator;

pub use error::{JwtError, JwtResult};
