//! Secret types for signing material.
//!
//! Re-exports the [`secrecy`] types used for HMAC secrets and private keys.
//! `SecretString` implements `Debug` with redaction, so any config struct that
//! derives `Debug` while holding key material stays safe to log.
//!
//! # Example
//!
//! ```rust
//! use jwt_auth::secret::{ExposeSecret, SecretString};
//!
//! let secret = SecretString::from("hs256-shared-secret");
//! assert!(!format!("{secret:?}").contains("hs256"));
//! assert_eq!(secret.expose_secret(), "hs256-shared-secret");
//! ```

pub use secrecy::{ExposeSecret, SecretString};
