//! Signing provider seam.
//!
//! The core never touches cryptography directly. A [`SigningProvider`] turns
//! a claim map into a signed token string and back; everything temporal is
//! enforced by the core after decoding.

mod jwt;

pub use jwt::JwtProvider;
pub use jsonwebtoken::Algorithm;

use crate::error::JwtResult;
use serde_json::{Map, Value};

/// Signs and verifies compact tokens.
///
/// Implementations must be stateless or internally synchronized: one
/// provider is shared by every caller of a
/// [`TokenManager`](crate::manager::TokenManager).
pub trait SigningProvider: Send + Sync {
    /// Sign `claims` into a compact token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingFailed` if the token cannot be produced.
    fn encode(&self, claims: &Map<String, Value>) -> JwtResult<String>;

    /// Verify the signature and structure of `token` and return its claims.
    ///
    /// Implementations must not reject a token for temporal reasons
    /// (`exp`, `nbf`, `iat`): refresh relies on decoding expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::TokenInvalid` if the token is malformed or the
    /// signature does not verify.
    fn decode(&self, token: &str) -> JwtResult<Map<String, Value>>;
}
