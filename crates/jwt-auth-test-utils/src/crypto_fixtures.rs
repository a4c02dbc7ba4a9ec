//! Deterministic cryptographic fixtures for testing
//!
//! Provides a fixed HMAC secret and reproducible Ed25519 keypairs.
//! All fixtures are deterministic based on seed values.

use jwt_auth::provider::{Algorithm, JwtProvider};
use jwt_auth::secret::SecretString;
use ring::signature::{Ed25519KeyPair, KeyPair};
use thiserror::Error;

/// Shared secret used by every HMAC fixture.
pub const TEST_SECRET: &str = "jwt-auth-test-secret-do-not-use-in-production";

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Deterministic Ed25519 keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestKeyPair {
    /// Raw 32-byte public key.
    pub public_key: Vec<u8>,
    /// PKCS#8 v1 DER private key.
    pub private_key_pkcs8: Vec<u8>,
}

/// Generate a deterministic Ed25519 signing key for testing.
///
/// The same seed always produces the same keypair, ensuring test reproducibility.
///
/// # Example
/// ```rust,ignore
/// let keys = test_signing_key(1)?;
/// assert_eq!(keys, test_signing_key(1)?);
/// ```
pub fn test_signing_key(seed: u8) -> Result<TestKeyPair, FixtureError> {
    // Create deterministic 32-byte seed from input
    let mut seed_bytes = [0u8; 32];
    seed_bytes[0] = seed;
    for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
        *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
    }

    let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test keypair: {:?}", e)))?;

    Ok(TestKeyPair {
        public_key: key_pair.public_key().as_ref().to_vec(),
        private_key_pkcs8: build_pkcs8_from_seed(&seed_bytes),
    })
}

/// Build PKCS#8 v1 document from Ed25519 seed
///
/// Ring does not export PKCS#8 for a seeded keypair, so the DER is written
/// by hand:
///
/// ```text
/// SEQUENCE {
///   version         INTEGER (0),
///   algorithm       SEQUENCE { OID 1.3.101.112 },
///   privateKey      OCTET STRING { OCTET STRING (32-byte seed) }
/// }
/// ```
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::with_capacity(48);
    pkcs8.extend_from_slice(&[0x30, 0x2e]);
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);
    pkcs8.extend_from_slice(&[0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70]);
    pkcs8.extend_from_slice(&[0x04, 0x22, 0x04, 0x20]);
    pkcs8.extend_from_slice(seed);
    pkcs8
}

/// HS256 provider over [`TEST_SECRET`].
pub fn test_hmac_provider() -> JwtProvider {
    JwtProvider::hmac(Algorithm::HS256, &SecretString::from(TEST_SECRET))
        .expect("HS256 is an HMAC algorithm")
}

/// `EdDSA` provider over the deterministic keypair for `seed`.
pub fn test_ed25519_provider(seed: u8) -> JwtProvider {
    let keys = test_signing_key(seed).expect("Failed to generate test keypair");
    JwtProvider::ed25519_der(&keys.private_key_pkcs8, &keys.public_key)
}
