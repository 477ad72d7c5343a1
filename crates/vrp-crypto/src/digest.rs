//! # SHA-256 Digest Computation

use sha2::{Digest, Sha256};

use crate::encoding::bytes_to_hex;

/// Compute a SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

/// Compute a SHA-256 digest as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    bytes_to_hex(&sha256(data))
}
