//! Token lifecycle orchestration.
//!
//! [`TokenManager`] is the single place where signing, payload validation and
//! blacklist policy are composed:
//!
//! - `encode` signs a validated payload
//! - `decode` verifies, validates and checks the blacklist
//! - `refresh` exchanges a token for a new one, revoking the old
//! - `invalidate` revokes a token
//!
//! # Refresh ordering
//!
//! `refresh` decodes the old token, computes the new claim set, revokes the
//! old token and only then signs the new one. A failure after revocation
//! leaves the caller without a valid token and forces re-authentication.

use crate::blacklist::Blacklist;
use crate::claims::{ClaimFactory, ISSUED_AT, SUBJECT, SUBJECT_TYPE};
use crate::clock::{Clock, SystemClock};
use crate::config::JwtConfig;
use crate::error::{JwtError, JwtResult};
use crate::payload::{Payload, PayloadFactory};
use crate::provider::{JwtProvider, SigningProvider};
use crate::storage::Storage;
use crate::token::Token;
use crate::validator::{PayloadValidator, ValidationMode};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Options for [`TokenManager::refresh_with`].
#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    /// Revoke the old token permanently instead of until its refresh window
    /// closes.
    pub force_forever: bool,
    /// Regenerate `iat`, `nbf` and `exp` from the refresh instant. Without
    /// it the new token keeps the original `iat`.
    pub reset_claims: bool,
    /// Extra claims for the new token. Persistent claims, `sub` and `iat`
    /// from the old token take precedence.
    pub custom_claims: Map<String, Value>,
}

/// Encodes, decodes, refreshes and revokes tokens.
///
/// Shareable across threads; the only mutable state lives in the blacklist
/// storage.
pub struct TokenManager {
    provider: Arc<dyn SigningProvider>,
    blacklist: Blacklist,
    payload_factory: PayloadFactory,
    blacklist_enabled: bool,
    persistent_claims: Vec<String>,
    lock_subject: bool,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("blacklist", &self.blacklist)
            .field("payload_factory", &self.payload_factory)
            .field("blacklist_enabled", &self.blacklist_enabled)
            .field("persistent_claims", &self.persistent_claims)
            .field("lock_subject", &self.lock_subject)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Manager with the blacklist enabled, no persistent claims and subject
    /// locking on.
    #[must_use]
    pub fn new(
        provider: Arc<dyn SigningProvider>,
        blacklist: Blacklist,
        payload_factory: PayloadFactory,
    ) -> Self {
        Self {
            provider,
            blacklist,
            payload_factory,
            blacklist_enabled: true,
            persistent_claims: Vec::new(),
            lock_subject: true,
        }
    }

    /// Wire a manager from `config` using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if `config` does not validate or the
    /// signing keys do not parse.
    pub fn from_config(config: &JwtConfig, storage: Arc<dyn Storage>) -> JwtResult<Self> {
        Self::from_config_with_clock(config, storage, Arc::new(SystemClock))
    }

    /// [`TokenManager::from_config`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::from_config`].
    pub fn from_config_with_clock(
        config: &JwtConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> JwtResult<Self> {
        config.validate()?;
        let provider = JwtProvider::from_config(config)?;
        Ok(Self::from_parts(config, Arc::new(provider), storage, clock))
    }

    /// Wire a manager from `config` around a caller-supplied provider. The
    /// key material in `config` is ignored.
    #[must_use]
    pub fn from_parts(
        config: &JwtConfig,
        provider: Arc<dyn SigningProvider>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let claim_factory = ClaimFactory::new(clock.clone(), config.issuer.clone())
            .with_ttl(config.ttl)
            .with_leeway(config.leeway);
        let validator = PayloadValidator::new(clock.clone())
            .with_required_claims(config.required_claims.iter().cloned())
            .with_refresh_ttl(config.refresh_ttl)
            .with_leeway(config.leeway);
        let blacklist = Blacklist::new(storage, clock)
            .with_grace_period(config.blacklist_grace_period)
            .with_refresh_ttl(config.refresh_ttl)
            .with_leeway(config.leeway);

        Self::new(
            provider,
            blacklist,
            PayloadFactory::new(claim_factory, validator),
        )
        .with_blacklist_enabled(config.blacklist_enabled)
        .with_persistent_claims(config.persistent_claims.iter().cloned())
        .with_lock_subject(config.lock_subject)
    }

    #[must_use]
    pub fn with_blacklist_enabled(mut self, enabled: bool) -> Self {
        self.blacklist_enabled = enabled;
        self
    }

    /// Claims copied from the old payload on refresh.
    #[must_use]
    pub fn with_persistent_claims<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.persistent_claims = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_lock_subject(mut self, lock_subject: bool) -> Self {
        self.lock_subject = lock_subject;
        self
    }

    // ----- Lifecycle -----

    /// Sign `payload`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingFailed` if the provider fails.
    #[instrument(skip_all)]
    pub fn encode(&self, payload: &Payload) -> JwtResult<Token> {
        self.provider.encode(&payload.to_map()).map(Token::from)
    }

    /// Verify and validate `token` in normal mode.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` for oversized, malformed or badly signed tokens,
    ///   missing required claims or `iat`/`nbf` in the future
    /// - `TokenExpired` once `exp` has passed
    /// - `TokenBlacklisted` if `check_blacklist` is set, the blacklist is
    ///   enabled and the token is revoked outside its grace window
    /// - `Storage` if the blacklist store fails
    pub fn decode(&self, token: &Token, check_blacklist: bool) -> JwtResult<Payload> {
        self.decode_as(token, ValidationMode::Normal, check_blacklist)
    }

    /// [`TokenManager::decode`] under an explicit validation mode.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::decode`]; in refresh mode an elapsed `exp` is
    /// tolerated and only the refresh window yields `TokenExpired`.
    #[instrument(skip_all, fields(mode = ?mode))]
    pub fn decode_as(
        &self,
        token: &Token,
        mode: ValidationMode,
        check_blacklist: bool,
    ) -> JwtResult<Payload> {
        token.check_size()?;
        let raw = self.provider.decode(token.as_str())?;
        let payload = self.payload_factory.from_raw(raw, mode)?;

        if check_blacklist && self.blacklist_enabled && self.blacklist.has(&payload)? {
            tracing::debug!(target: "jwt_auth.manager", "Token rejected: blacklisted");
            return Err(JwtError::TokenBlacklisted);
        }

        Ok(payload)
    }

    /// Exchange `token` for a new one.
    ///
    /// # Errors
    ///
    /// - everything [`TokenManager::decode_as`] returns in refresh mode
    /// - `InvalidClaim` / `TokenInvalid` if the new payload cannot be built
    /// - `EncodingFailed` if signing fails
    pub fn refresh(
        &self,
        token: &Token,
        force_forever: bool,
        reset_claims: bool,
    ) -> JwtResult<Token> {
        self.refresh_with(
            token,
            RefreshOptions {
                force_forever,
                reset_claims,
                custom_claims: Map::new(),
            },
        )
    }

    /// [`TokenManager::refresh`] with explicit custom claims.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::refresh`].
    #[instrument(skip_all)]
    pub fn refresh_with(&self, token: &Token, options: RefreshOptions) -> JwtResult<Token> {
        let old = self.decode_as(token, ValidationMode::Refresh, true)?;
        let claims = self.build_refresh_claims(&old, options.custom_claims);

        if self.blacklist_enabled {
            self.revoke(&old, options.force_forever)?;
        }

        let payload = self.payload_factory.make(&claims, options.reset_claims)?;
        let token = self.encode(&payload)?;

        tracing::debug!(
            target: "jwt_auth.manager",
            reset_claims = options.reset_claims,
            "Token refreshed"
        );
        Ok(token)
    }

    /// Revoke `token`. Expired or already revoked tokens are accepted as long
    /// as they are inside their refresh window.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the blacklist is disabled
    /// - everything [`TokenManager::decode_as`] returns in refresh mode,
    ///   except `TokenBlacklisted`
    #[instrument(skip_all)]
    pub fn invalidate(&self, token: &Token, force_forever: bool) -> JwtResult<bool> {
        if !self.blacklist_enabled {
            return Err(JwtError::Configuration(
                "You must have the blacklist enabled to invalidate a token.".to_string(),
            ));
        }

        let payload = self.decode_as(token, ValidationMode::Refresh, false)?;
        self.revoke(&payload, force_forever)
    }

    // ----- Conveniences -----

    /// Issue a token for `subject` with the default claims plus `custom`.
    ///
    /// # Errors
    ///
    /// See [`PayloadFactory::make`] and [`TokenManager::encode`].
    pub fn issue(&self, subject: &str, custom: Map<String, Value>) -> JwtResult<Token> {
        self.issue_claims(subject, None, custom)
    }

    /// Issue a token for `subject` of kind `subject_type`. With subject
    /// locking on, the token carries a `prv` claim binding it to that kind.
    ///
    /// # Errors
    ///
    /// See [`TokenManager::issue`].
    pub fn issue_for(
        &self,
        subject_type: &str,
        subject: &str,
        custom: Map<String, Value>,
    ) -> JwtResult<Token> {
        self.issue_claims(subject, Some(subject_type), custom)
    }

    /// True if `token` decodes, validates and is not blacklisted.
    #[must_use]
    pub fn check(&self, token: &Token) -> bool {
        self.decode(token, true).is_ok()
    }

    /// True if `payload` was issued for `subject_type`, or carries no
    /// subject lock, or locking is off.
    #[must_use]
    pub fn check_subject_type(&self, payload: &Payload, subject_type: &str) -> bool {
        if !self.lock_subject {
            return true;
        }
        match payload.get(SUBJECT_TYPE) {
            Some(Value::String(prv)) => prv == subject_type_hash(subject_type),
            Some(_) => false,
            None => true,
        }
    }

    // ----- Accessors -----

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn SigningProvider> {
        &self.provider
    }

    #[must_use]
    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn blacklist_mut(&mut self) -> &mut Blacklist {
        &mut self.blacklist
    }

    #[must_use]
    pub fn payload_factory(&self) -> &PayloadFactory {
        &self.payload_factory
    }

    pub fn payload_factory_mut(&mut self) -> &mut PayloadFactory {
        &mut self.payload_factory
    }

    #[must_use]
    pub fn is_blacklist_enabled(&self) -> bool {
        self.blacklist_enabled
    }

    #[must_use]
    pub fn persistent_claims(&self) -> &[String] {
        &self.persistent_claims
    }

    #[must_use]
    pub fn lock_subject(&self) -> bool {
        self.lock_subject
    }

    fn issue_claims(
        &self,
        subject: &str,
        subject_type: Option<&str>,
        mut claims: Map<String, Value>,
    ) -> JwtResult<Token> {
        claims.insert(SUBJECT.to_string(), Value::from(subject));
        if let Some(subject_type) = subject_type.filter(|_| self.lock_subject) {
            claims.insert(
                SUBJECT_TYPE.to_string(),
                Value::from(subject_type_hash(subject_type)),
            );
        }

        let payload = self.payload_factory.make(&claims, false)?;
        self.encode(&payload)
    }

    fn build_refresh_claims(
        &self,
        old: &Payload,
        custom: Map<String, Value>,
    ) -> Map<String, Value> {
        let mut claims = custom;

        let carried = self
            .persistent_claims
            .iter()
            .map(String::as_str)
            .chain(self.lock_subject.then_some(SUBJECT_TYPE))
            .chain([SUBJECT, ISSUED_AT]);

        for name in carried {
            if let Some(value) = old.get(name) {
                claims.insert(name.to_string(), value);
            }
        }
        claims
    }

    fn revoke(&self, payload: &Payload, force_forever: bool) -> JwtResult<bool> {
        if force_forever {
            self.blacklist.add_forever(payload)
        } else {
            self.blacklist.add(payload)
        }
    }
}

/// Value of the `prv` claim for `subject_type`: its SHA-256 in hex.
#[must_use]
pub fn subject_type_hash(subject_type: &str) -> String {
    hex::encode(Sha256::digest(subject_type.as_bytes()))
}
