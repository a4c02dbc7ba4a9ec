//! Typed claims and their containers.
//!
//! - [`Claim`] is a single named value whose type and validation rules are
//!   fixed by its [`ClaimKind`].
//! - [`ClaimCollection`] is an ordered, name-keyed set of claims.
//! - [`ClaimFactory`] turns raw JSON values into claims using an explicit
//!   name-to-kind table, and generates default claims for new tokens.

mod claim;
mod collection;
mod factory;

pub use claim::{Claim, ClaimKind, ClaimValue, TimeContext};
pub use collection::ClaimCollection;
pub use factory::{ClaimFactory, DEFAULT_TTL_MINUTES};

/// Issuer claim name.
pub const ISSUER: &str = "iss";
/// Subject claim name.
pub const SUBJECT: &str = "sub";
/// Audience claim name.
pub const AUDIENCE: &str = "aud";
/// Expiration claim name.
pub const EXPIRATION: &str = "exp";
/// Not-before claim name.
pub const NOT_BEFORE: &str = "nbf";
/// Issued-at claim name.
pub const ISSUED_AT: &str = "iat";
/// JWT ID claim name.
pub const JWT_ID: &str = "jti";
/// Subject-type lock claim, present when subject locking is enabled.
pub const SUBJECT_TYPE: &str = "prv";

/// Claim names with a registered kind in a fresh [`ClaimFactory`].
pub const REGISTERED_CLAIMS: [&str; 7] = [
    ISSUER,
    SUBJECT,
    AUDIENCE,
    EXPIRATION,
    NOT_BEFORE,
    ISSUED_AT,
    JWT_ID,
];
