//! # Key and Secret Provisioning
//!
//! One-time utilities that produce the material consumed at runtime: ECDSA
//! key pairs for the token codec and the HMAC secret for the short-code
//! engine. The resulting material is owned by an external key-management
//! collaborator; the runtime only reads it.

use rand::RngCore;
use vrp_core::config::MIN_SECRET_LEN;
use vrp_core::{RedemptionError, TokenAlgorithm};
use zeroize::Zeroizing;

use crate::ecdsa::{Curve, EcPrivateKey, EcPublicKey};
use crate::encoding::base64url_encode;

/// A PEM-encoded ECDSA key pair.
///
/// Does not implement `Serialize`: the private half must not end up in
/// logs, responses or artifacts by accident.
pub struct KeyPair {
    private_key: Zeroizing<String>,
    public_key: String,
    algorithm: TokenAlgorithm,
}

impl KeyPair {
    /// Assemble a pair from existing PEM material, checking that both halves
    /// parse for `algorithm` and belong together.
    pub fn from_pem(
        private_key: impl Into<String>,
        public_key: impl Into<String>,
        algorithm: TokenAlgorithm,
    ) -> Result<Self, RedemptionError> {
        let pair = Self {
            private_key: Zeroizing::new(private_key.into()),
            public_key: public_key.into(),
            algorithm,
        };
        check_key_pair(&pair)?;
        Ok(pair)
    }

    /// PKCS#8 PEM private key.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// SPKI PEM public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn algorithm(&self) -> TokenAlgorithm {
        self.algorithm
    }

    pub fn curve(&self) -> Curve {
        Curve::from_algorithm(self.algorithm)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("private_key", &"<private>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Result of a key rotation.
#[derive(Debug)]
pub struct KeyRotation {
    /// Public key of the retired pair. Verifiers keep it until every token
    /// signed with it has expired.
    pub previous_public_key: String,
    /// The pair new tokens are signed with.
    pub next: KeyPair,
}

/// Generate a fresh key pair for `curve`.
pub fn generate_key_pair(curve: Curve) -> Result<KeyPair, RedemptionError> {
    let secret = EcPrivateKey::generate(curve);
    let private_key = secret
        .to_pem()
        .map_err(|e| RedemptionError::KeyGenerationFailed(e.to_string()))?;
    let public_key = secret
        .public_key()
        .to_pem()
        .map_err(|e| RedemptionError::KeyGenerationFailed(e.to_string()))?;
    tracing::info!(curve = %curve, "generated signing key pair");
    Ok(KeyPair {
        private_key,
        public_key,
        algorithm: curve.algorithm(),
    })
}

/// Generate a random base64url secret of exactly `length` characters.
///
/// `length` must be at least [`MIN_SECRET_LEN`].
pub fn generate_secret(length: usize) -> Result<String, RedemptionError> {
    if length < MIN_SECRET_LEN {
        return Err(RedemptionError::KeyGenerationFailed(format!(
            "secret length must be at least {MIN_SECRET_LEN}, got {length}"
        )));
    }
    // 4 base64 characters per 3 bytes; round up.
    let mut bytes = Zeroizing::new(vec![0u8; (length * 3).div_ceil(4)]);
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RedemptionError::KeyGenerationFailed(format!("OS RNG unavailable: {e}")))?;
    let mut secret = base64url_encode(&bytes);
    secret.truncate(length);
    Ok(secret)
}

/// Confirm that both halves of `pair` parse for its algorithm and that the
/// public key is the private key's.
pub fn check_key_pair(pair: &KeyPair) -> Result<(), RedemptionError> {
    let curve = pair.curve();
    let secret = EcPrivateKey::from_pem(pair.private_key(), curve)?;
    let public = EcPublicKey::from_pem(pair.public_key(), curve)?;
    if secret.public_key() != public {
        return Err(RedemptionError::InvalidKey(
            "public key does not belong to the private key".into(),
        ));
    }
    Ok(())
}

/// Retire `current` and issue a new pair on the same curve.
pub fn rotate_key_pair(current: &KeyPair) -> Result<KeyRotation, RedemptionError> {
    check_key_pair(current).map_err(|e| {
        RedemptionError::KeyRotationFailed(format!("current key pair rejected: {e}"))
    })?;
    let next = generate_key_pair(current.curve())
        .map_err(|e| RedemptionError::KeyRotationFailed(e.to_string()))?;
    tracing::info!(algorithm = %current.algorithm(), "rotated signing key pair");
    Ok(KeyRotation {
        previous_public_key: current.public_key().to_string(),
        next,
    })
}
