//! Token engine configuration.
//!
//! Configuration is loaded from environment variables. Signing secrets are
//! held as [`SecretString`] and redacted in Debug output.

use crate::claims::{DEFAULT_TTL_MINUTES, EXPIRATION};
use crate::error::JwtError;
use crate::secret::{ExposeSecret, SecretString};
use crate::validator::{DEFAULT_REFRESH_TTL_MINUTES, DEFAULT_REQUIRED_CLAIMS};
use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default issuer written into the `iss` claim.
pub const DEFAULT_ISSUER: &str = "jwt-auth";

/// Maximum allowed leeway in seconds (10 minutes).
pub const MAX_LEEWAY_SECONDS: i64 = 600;

/// Token engine configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared secret for HMAC algorithms.
    pub secret: Option<SecretString>,

    /// PEM public key for asymmetric algorithms.
    pub public_key: Option<String>,

    /// PEM private key for asymmetric algorithms.
    pub private_key: Option<SecretString>,

    /// Token lifetime in minutes. `None` issues tokens without `exp`.
    pub ttl: Option<i64>,

    /// Refresh window in minutes, anchored at `iat`. `None` is unbounded.
    pub refresh_ttl: Option<i64>,

    pub algorithm: Algorithm,

    /// Claims every payload must carry.
    pub required_claims: Vec<String>,

    /// Claims copied from the old token into its refreshed successor.
    pub persistent_claims: Vec<String>,

    /// Add a `prv` claim binding tokens to the subject type they were
    /// issued for.
    pub lock_subject: bool,

    /// Clock skew tolerance in seconds for every temporal rule.
    pub leeway: i64,

    pub blacklist_enabled: bool,

    /// Seconds during which a freshly blacklisted token is still accepted.
    pub blacklist_grace_period: i64,

    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            public_key: None,
            private_key: None,
            ttl: Some(DEFAULT_TTL_MINUTES),
            refresh_ttl: Some(DEFAULT_REFRESH_TTL_MINUTES),
            algorithm: Algorithm::HS256,
            required_claims: DEFAULT_REQUIRED_CLAIMS
                .iter()
                .map(ToString::to_string)
                .collect(),
            persistent_claims: Vec::new(),
            lock_subject: true,
            leeway: 0,
            blacklist_enabled: true,
            blacklist_grace_period: 0,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }
}

/// Custom Debug implementation that redacts key material.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key.as_ref().map(|_| "[SET]"))
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("ttl", &self.ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("algorithm", &self.algorithm)
            .field("required_claims", &self.required_claims)
            .field("persistent_claims", &self.persistent_claims)
            .field("lock_subject", &self.lock_subject)
            .field("leeway", &self.leeway)
            .field("blacklist_enabled", &self.blacklist_enabled)
            .field("blacklist_grace_period", &self.blacklist_grace_period)
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for JwtError {
    fn from(err: ConfigError) -> Self {
        JwtError::Configuration(err.to_string())
    }
}

impl JwtConfig {
    /// Defaults with an HMAC secret, the minimal loadable configuration.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(SecretString::from(secret.into())),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// See [`JwtConfig::from_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse or the resulting
    /// configuration fails [`JwtConfig::validate`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let algorithm = match vars.get("JWT_ALGO") {
            Some(value) => Algorithm::from_str(value).map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "JWT_ALGO is not a supported algorithm, got '{value}'"
                ))
            })?,
            None => defaults.algorithm,
        };

        let config = Self {
            secret: vars.get("JWT_SECRET").cloned().map(SecretString::from),
            public_key: vars.get("JWT_PUBLIC_KEY").cloned(),
            private_key: vars.get("JWT_PRIVATE_KEY").cloned().map(SecretString::from),
            ttl: parse_minutes(vars, "JWT_TTL", defaults.ttl)?,
            refresh_ttl: parse_minutes(vars, "JWT_REFRESH_TTL", defaults.refresh_ttl)?,
            algorithm,
            required_claims: parse_list(vars, "JWT_REQUIRED_CLAIMS")
                .unwrap_or(defaults.required_claims),
            persistent_claims: parse_list(vars, "JWT_PERSISTENT_CLAIMS")
                .unwrap_or(defaults.persistent_claims),
            lock_subject: parse_bool(vars, "JWT_LOCK_SUBJECT", defaults.lock_subject)?,
            leeway: parse_seconds(vars, "JWT_LEEWAY", defaults.leeway)?,
            blacklist_enabled: parse_bool(
                vars,
                "JWT_BLACKLIST_ENABLED",
                defaults.blacklist_enabled,
            )?,
            blacklist_grace_period: parse_seconds(
                vars,
                "JWT_BLACKLIST_GRACE_PERIOD",
                defaults.blacklist_grace_period,
            )?,
            issuer: vars.get("JWT_ISSUER").cloned().unwrap_or(defaults.issuer),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// - `MissingEnvVar` if the key material the algorithm needs is absent
    /// - `InvalidValue` for out-of-range durations, an empty issuer, or
    ///   `exp` required while tokens are issued without expiry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_LEEWAY_SECONDS).contains(&self.leeway) {
            return Err(ConfigError::InvalidValue(format!(
                "JWT_LEEWAY must be between 0 and {MAX_LEEWAY_SECONDS} seconds, got {}",
                self.leeway
            )));
        }

        if self.blacklist_grace_period < 0 {
            return Err(ConfigError::InvalidValue(format!(
                "JWT_BLACKLIST_GRACE_PERIOD must not be negative, got {}",
                self.blacklist_grace_period
            )));
        }

        for (name, value) in [("JWT_TTL", self.ttl), ("JWT_REFRESH_TTL", self.refresh_ttl)] {
            if let Some(minutes) = value.filter(|m| *m <= 0) {
                return Err(ConfigError::InvalidValue(format!(
                    "{name} must be positive, got {minutes}"
                )));
            }
        }

        if self.ttl.is_none() && self.required_claims.iter().any(|c| c == EXPIRATION) {
            return Err(ConfigError::InvalidValue(
                "JWT_TTL may only be null when exp is not a required claim".to_string(),
            ));
        }

        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT_ISSUER must not be empty".to_string(),
            ));
        }

        if is_hmac(self.algorithm) {
            if self
                .secret
                .as_ref()
                .map_or(true, |s| s.expose_secret().is_empty())
            {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
            }
        } else {
            if self.public_key.is_none() {
                return Err(ConfigError::MissingEnvVar("JWT_PUBLIC_KEY".to_string()));
            }
            if self.private_key.is_none() {
                return Err(ConfigError::MissingEnvVar("JWT_PRIVATE_KEY".to_string()));
            }
        }

        Ok(())
    }
}

/// True for the shared-secret algorithms.
#[must_use]
pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

fn parse_minutes(
    vars: &HashMap<String, String>,
    name: &str,
    default: Option<i64>,
) -> Result<Option<i64>, ConfigError> {
    match vars.get(name).map(|v| v.trim()) {
        None => Ok(default),
        Some(v) if v.eq_ignore_ascii_case("null") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|e| {
            ConfigError::InvalidValue(format!(
                "{name} must be a valid integer or 'null', got '{v}': {e}"
            ))
        }),
    }
}

fn parse_seconds(
    vars: &HashMap<String, String>,
    name: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e| {
            ConfigError::InvalidValue(format!("{name} must be a valid integer, got '{v}': {e}"))
        }),
    }
}

fn parse_bool(
    vars: &HashMap<String, String>,
    name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue(format!(
                "{name} must be a boolean, got '{v}'"
            ))),
        },
    }
}

fn parse_list(vars: &HashMap<String, String>, name: &str) -> Option<Vec<String>> {
    vars.get(name).map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
