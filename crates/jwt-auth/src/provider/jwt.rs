use super::SigningProvider;
use crate::config::{is_hmac, JwtConfig};
use crate::error::{JwtError, JwtResult};
use crate::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use std::fmt;

/// [`SigningProvider`] backed by the `jsonwebtoken` crate.
///
/// Supports HS256/384/512, RS256/384/512, PS256/384/512, ES256/384 and
/// `EdDSA`. Only the signature, the algorithm and the token structure are
/// verified; `exp`, `nbf`, `iat` and `aud` are left to the core.
#[derive(Clone)]
pub struct JwtProvider {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Custom Debug implementation that hides key material.
impl fmt::Debug for JwtProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtProvider")
            .field("algorithm", &self.algorithm)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl JwtProvider {
    /// Provider for the algorithm and keys in `config`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if the key material is missing or
    /// does not parse for the configured algorithm.
    pub fn from_config(config: &JwtConfig) -> JwtResult<Self> {
        if is_hmac(config.algorithm) {
            let secret = config
                .secret
                .as_ref()
                .ok_or_else(|| JwtError::Configuration("Secret is not set".to_string()))?;
            return Self::hmac(config.algorithm, secret);
        }

        let private_key = config
            .private_key
            .as_ref()
            .ok_or_else(|| JwtError::Configuration("Private key is not set".to_string()))?;
        let public_key = config
            .public_key
            .as_ref()
            .ok_or_else(|| JwtError::Configuration("Public key is not set".to_string()))?;

        Self::from_pem(
            config.algorithm,
            private_key.expose_secret().as_bytes(),
            public_key.as_bytes(),
        )
    }

    /// Shared-secret provider.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if `algorithm` is not an HMAC
    /// algorithm.
    pub fn hmac(algorithm: Algorithm, secret: &SecretString) -> JwtResult<Self> {
        if !is_hmac(algorithm) {
            return Err(JwtError::Configuration(format!(
                "{algorithm:?} is not an HMAC algorithm"
            )));
        }
        let secret = secret.expose_secret().as_bytes();
        Ok(Self::with_keys(
            algorithm,
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        ))
    }

    /// Asymmetric provider from PEM keys (PKCS#8 private key, SPKI public key
    /// for `EdDSA`; PKCS#1 or PKCS#8 for RSA; SEC1 or PKCS#8 for ECDSA).
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if either key does not parse for
    /// `algorithm`.
    pub fn from_pem(algorithm: Algorithm, private_pem: &[u8], public_pem: &[u8]) -> JwtResult<Self> {
        let keys = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => EncodingKey::from_rsa_pem(private_pem)
                .and_then(|enc| DecodingKey::from_rsa_pem(public_pem).map(|dec| (enc, dec))),
            Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(private_pem)
                .and_then(|enc| DecodingKey::from_ec_pem(public_pem).map(|dec| (enc, dec))),
            Algorithm::EdDSA => EncodingKey::from_ed_pem(private_pem)
                .and_then(|enc| DecodingKey::from_ed_pem(public_pem).map(|dec| (enc, dec))),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Err(JwtError::Configuration(format!(
                    "{algorithm:?} requires a shared secret, not a key pair"
                )));
            }
        };

        let (encoding_key, decoding_key) = keys.map_err(|e| {
            tracing::debug!(target: "jwt_auth.provider", error = %e, "Invalid signing key");
            JwtError::Configuration(format!("Invalid {algorithm:?} key: {e}"))
        })?;

        Ok(Self::with_keys(algorithm, encoding_key, decoding_key))
    }

    /// `EdDSA` provider from a PKCS#8 DER private key and the raw 32-byte
    /// public key.
    #[must_use]
    pub fn ed25519_der(private_key_pkcs8: &[u8], public_key: &[u8]) -> Self {
        Self::with_keys(
            Algorithm::EdDSA,
            EncodingKey::from_ed_der(private_key_pkcs8),
            DecodingKey::from_ed_der(public_key),
        )
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn with_keys(algorithm: Algorithm, encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
        }
    }
}

impl SigningProvider for JwtProvider {
    fn encode(&self, claims: &Map<String, Value>) -> JwtResult<String> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key).map_err(|e| {
            tracing::debug!(target: "jwt_auth.provider", error = %e, "Token signing failed");
            JwtError::EncodingFailed(e.to_string())
        })
    }

    fn decode(&self, token: &str) -> JwtResult<Map<String, Value>> {
        decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(target: "jwt_auth.provider", error = %e, "Token verification failed");
                JwtError::TokenInvalid("Could not decode token".to_string())
            })
    }
}
