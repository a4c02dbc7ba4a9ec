use super::Payload;
use crate::claims::{
    ClaimCollection, ClaimFactory, EXPIRATION, ISSUED_AT, ISSUER, JWT_ID, NOT_BEFORE,
};
use crate::error::{JwtError, JwtResult};
use crate::validator::{PayloadValidator, ValidationMode};
use serde_json::{Map, Value};

/// Claims generated for every new token unless the caller supplies them.
pub const DEFAULT_CLAIMS: [&str; 5] = [ISSUER, ISSUED_AT, EXPIRATION, NOT_BEFORE, JWT_ID];

/// Assembles payloads, either fresh for encoding or rebuilt from a decoded
/// claim map.
#[derive(Debug, Clone)]
pub struct PayloadFactory {
    claim_factory: ClaimFactory,
    validator: PayloadValidator,
    default_claims: Vec<String>,
}

impl PayloadFactory {
    #[must_use]
    pub fn new(claim_factory: ClaimFactory, validator: PayloadValidator) -> Self {
        Self {
            claim_factory,
            validator,
            default_claims: DEFAULT_CLAIMS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replace the list of claims generated for new tokens.
    #[must_use]
    pub fn with_default_claims<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.default_claims = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn claim_factory(&self) -> &ClaimFactory {
        &self.claim_factory
    }

    /// Mutable access, e.g. to [`ClaimFactory::extend`] the name table.
    pub fn claim_factory_mut(&mut self) -> &mut ClaimFactory {
        &mut self.claim_factory
    }

    #[must_use]
    pub fn validator(&self) -> &PayloadValidator {
        &self.validator
    }

    #[must_use]
    pub fn default_claims(&self) -> &[String] {
        &self.default_claims
    }

    /// Build and validate a payload for a new token.
    ///
    /// Default claims come first, in their configured order; a caller value
    /// for a default claim replaces the generated one. With `reset_claims`,
    /// caller-supplied timestamp claims are dropped so that `iat`, `nbf` and
    /// `exp` are all regenerated from the current instant. Every claim is
    /// built against a single reading of the clock.
    ///
    /// # Errors
    ///
    /// - `InvalidClaim` if a caller-supplied value breaks its create-time rules
    /// - `TokenInvalid` / `TokenExpired` if the assembled payload fails
    ///   normal-mode validation (e.g. a required claim is missing)
    pub fn make(&self, custom: &Map<String, Value>, reset_claims: bool) -> JwtResult<Payload> {
        let now = self.claim_factory.now();
        let skip = |name: &str| reset_claims && self.claim_factory.kind_of(name).is_timestamp();

        let mut claims = ClaimCollection::new();
        for name in &self.default_claims {
            let claim = match custom.get(name.as_str()).filter(|_| !skip(name.as_str())) {
                Some(value) => Some(self.claim_factory.get_at(name, value.clone(), now)?),
                None => self.claim_factory.make_at(name, now)?,
            };
            if let Some(claim) = claim {
                claims.insert(claim);
            }
        }

        for (name, value) in custom {
            if claims.contains(name) || skip(name.as_str()) {
                continue;
            }
            claims.insert(self.claim_factory.get_at(name, value.clone(), now)?);
        }

        self.validator.check_at(claims, ValidationMode::Normal, now)
    }

    /// Rebuild a payload from a decoded claim map. No defaults are filled in.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` if any claim breaks its create-time rules, a required
    ///   claim is missing, or a temporal rule of `mode` fails
    /// - `TokenExpired` as decided by `mode`
    pub fn from_raw(&self, raw: Map<String, Value>, mode: ValidationMode) -> JwtResult<Payload> {
        let now = self.claim_factory.now();
        let claims = raw
            .into_iter()
            .map(|(name, value)| self.claim_factory.get_at(&name, value, now))
            .collect::<JwtResult<ClaimCollection>>()
            .map_err(|e| match e {
                JwtError::InvalidClaim { .. } => JwtError::TokenInvalid(e.to_string()),
                other => other,
            })?;

        self.validator.check_at(claims, mode, now)
    }

    /// Validate an already built collection.
    ///
    /// # Errors
    ///
    /// See [`PayloadValidator::check`].
    pub fn from_claims(&self, claims: ClaimCollection, mode: ValidationMode) -> JwtResult<Payload> {
        self.validator.check(claims, mode)
    }
}
