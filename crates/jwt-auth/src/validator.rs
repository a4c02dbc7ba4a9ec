//! Payload validation.
//!
//! Validation runs in one of two modes, chosen per call:
//!
//! - [`ValidationMode::Normal`] - required claims present, then every claim's
//!   payload-time rules (`iat`/`nbf` not in the future, `exp` not past)
//! - [`ValidationMode::Refresh`] - required claims present, then only the
//!   refresh-window rule (`iat + refresh_ttl` not past). Ordinary expiry is
//!   tolerated so that an expired token can still be exchanged.
//!
//! The mode is a call parameter, never validator state, so one validator can
//! be shared by concurrent callers.

use crate::claims::{ClaimCollection, TimeContext};
use crate::clock::Clock;
use crate::error::{JwtError, JwtResult};
use crate::payload::Payload;
use std::sync::Arc;

/// Claims a payload must carry unless configured otherwise.
pub const DEFAULT_REQUIRED_CLAIMS: [&str; 6] = ["iss", "iat", "exp", "nbf", "sub", "jti"];

/// Default refresh window in minutes (two weeks).
pub const DEFAULT_REFRESH_TTL_MINUTES: i64 = 20_160;

/// Which rule set a validation call applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Normal,
    Refresh,
}

/// Enforces required-claim presence and temporal correctness.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    required_claims: Vec<String>,
    /// Minutes; `None` disables the refresh-window check.
    refresh_ttl: Option<i64>,
    leeway: i64,
    clock: Arc<dyn Clock>,
}

impl PayloadValidator {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            required_claims: DEFAULT_REQUIRED_CLAIMS
                .iter()
                .map(ToString::to_string)
                .collect(),
            refresh_ttl: Some(DEFAULT_REFRESH_TTL_MINUTES),
            leeway: 0,
            clock,
        }
    }

    #[must_use]
    pub fn with_required_claims<S: Into<String>>(
        mut self,
        claims: impl IntoIterator<Item = S>,
    ) -> Self {
        self.required_claims = claims.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, refresh_ttl: Option<i64>) -> Self {
        self.refresh_ttl = refresh_ttl;
        self
    }

    #[must_use]
    pub fn with_leeway(mut self, leeway: i64) -> Self {
        self.leeway = leeway;
        self
    }

    #[must_use]
    pub fn required_claims(&self) -> &[String] {
        &self.required_claims
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> Option<i64> {
        self.refresh_ttl
    }

    #[must_use]
    pub fn leeway(&self) -> i64 {
        self.leeway
    }

    /// Validate `claims` and wrap them as a [`Payload`].
    ///
    /// This is the only way to obtain a `Payload`.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` if a required claim is missing, or `iat`/`nbf` lies in
    ///   the future (normal mode)
    /// - `TokenExpired` if `exp` has passed (normal mode) or the refresh
    ///   window has elapsed (refresh mode)
    pub fn check(&self, claims: ClaimCollection, mode: ValidationMode) -> JwtResult<Payload> {
        self.check_at(claims, mode, self.clock.now())
    }

    /// [`PayloadValidator::check`] against an explicit `now`.
    ///
    /// # Errors
    ///
    /// See [`PayloadValidator::check`].
    pub fn check_at(
        &self,
        claims: ClaimCollection,
        mode: ValidationMode,
        now: i64,
    ) -> JwtResult<Payload> {
        self.validate_at(&claims, mode, now)?;
        Ok(Payload::new(claims, mode))
    }

    /// Validate without taking ownership of the claims.
    ///
    /// # Errors
    ///
    /// See [`PayloadValidator::check`].
    pub fn validate(&self, claims: &ClaimCollection, mode: ValidationMode) -> JwtResult<()> {
        self.validate_at(claims, mode, self.clock.now())
    }

    /// [`PayloadValidator::validate`] against an explicit `now`.
    ///
    /// # Errors
    ///
    /// See [`PayloadValidator::check`].
    pub fn validate_at(
        &self,
        claims: &ClaimCollection,
        mode: ValidationMode,
        now: i64,
    ) -> JwtResult<()> {
        self.validate_structure(claims)?;

        let time = TimeContext::new(now, self.leeway);
        let result = match mode {
            ValidationMode::Normal => claims.validate_payload(time),
            ValidationMode::Refresh => match self.refresh_ttl {
                Some(refresh_ttl) => claims.validate_refresh(time, refresh_ttl),
                None => Ok(()),
            },
        };

        if let Err(e) = &result {
            tracing::debug!(
                target: "jwt_auth.validator",
                mode = ?mode,
                error = %e,
                "Payload rejected"
            );
        }
        result
    }

    /// Boolean form of [`PayloadValidator::validate`]; the reason is dropped.
    #[must_use]
    pub fn is_valid(&self, claims: &ClaimCollection, mode: ValidationMode) -> bool {
        self.validate(claims, mode).is_ok()
    }

    fn validate_structure(&self, claims: &ClaimCollection) -> JwtResult<()> {
        let missing = claims.missing(&self.required_claims);
        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            target: "jwt_auth.validator",
            missing = ?missing,
            "Payload rejected: required claims absent"
        );
        Err(JwtError::TokenInvalid(
            "JWT payload does not contain the required claims".to_string(),
        ))
    }
}
