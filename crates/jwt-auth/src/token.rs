//! Opaque signed token strings.
//!
//! A [`Token`] is what callers hold between requests. Its contents are
//! bearer credentials, so `Debug` never prints them.

use crate::error::{JwtError, JwtResult};
use std::fmt;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Larger tokens are rejected before they reach the signing provider, so no
/// base64 decoding or signature work is spent on them.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

// =============================================================================
// Token
// =============================================================================

/// Compact-serialized signed token (`header.payload.signature`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reject empty or oversized tokens.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::TokenInvalid` if the token is empty or longer than
    /// [`MAX_TOKEN_SIZE_BYTES`].
    pub fn check_size(&self) -> JwtResult<()> {
        if self.is_empty() {
            return Err(JwtError::TokenInvalid("Token is empty".to_string()));
        }
        if self.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(
                target: "jwt_auth.provider",
                token_size = self.len(),
                max_size = MAX_TOKEN_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(JwtError::TokenInvalid("Token is too large".to_string()));
        }
        Ok(())
    }
}

/// Custom Debug implementation that redacts the token.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&"[REDACTED]").finish()
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let token = Token::from("eyJhbGciOiJIUzI1NiJ9.e30.sig");
        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("eyJ"));
    }

    #[test]
    fn test_check_size_at_limit() {
        let token = Token::new("a".repeat(MAX_TOKEN_SIZE_BYTES));
        assert!(token.check_size().is_ok());
    }

    #[test]
    fn test_check_size_over_limit() {
        let token = Token::new("a".repeat(MAX_TOKEN_SIZE_BYTES + 1));
        assert_eq!(
            token.check_size(),
            Err(JwtError::TokenInvalid("Token is too large".to_string()))
        );
    }

    #[test]
    fn test_check_size_empty() {
        assert!(matches!(
            Token::new("").check_size(),
            Err(JwtError::TokenInvalid(_))
        ));
    }

    #[test]
    fn test_conversions() {
        let token = Token::from("abc".to_string());
        assert_eq!(token, "abc");
        assert_eq!(token.as_str(), "abc");
        assert_eq!(String::from(token.clone()), "abc");
        assert_eq!(token.into_string(), "abc");
    }
}
