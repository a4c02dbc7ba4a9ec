//! Error kinds surfaced by the token lifecycle.
//!
//! Every failure reaches the caller as a distinct variant. Mapping to
//! transport responses (HTTP status codes, bodies) belongs to the host.

use thiserror::Error;

/// Errors raised by claim construction, validation, signing and revocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// A single claim failed create-time validation.
    #[error("Invalid value provided for claim [{name}]")]
    InvalidClaim { name: String },

    /// Structural failure, bad signature, or a temporal rule violated in
    /// normal mode (`nbf`/`iat` in the future).
    #[error("{0}")]
    TokenInvalid(String),

    /// `exp` in the past, or the refresh window has elapsed.
    #[error("{0}")]
    TokenExpired(String),

    /// The payload is on the revocation list and outside its grace window.
    #[error("The token has been blacklisted")]
    TokenBlacklisted,

    /// The signing provider could not produce a token.
    #[error("Could not create token: {0}")]
    EncodingFailed(String),

    /// An operation was requested that the current configuration forbids.
    #[error("{0}")]
    Configuration(String),

    /// The blacklist store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl JwtError {
    /// Returns true when the token failed on `exp` or on an elapsed refresh
    /// window.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::TokenExpired(_))
    }

    pub(crate) fn invalid_claim(name: &str) -> Self {
        JwtError::InvalidClaim {
            name: name.to_string(),
        }
    }
}

/// Result type alias using `JwtError`
pub type JwtResult<T> = std::result::Result<T, JwtError>;
