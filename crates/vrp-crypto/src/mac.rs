//! # HMAC-SHA256 and Constant-Time Comparison
//!
//! Every secret-bearing equality check in the workspace (short-code HMAC,
//! checksum) goes through [`constant_time_eq`] so the comparison time does
//! not depend on how many leading bytes match.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use vrp_core::RedemptionError;

use crate::encoding::bytes_to_hex;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32], RedemptionError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| RedemptionError::InvalidKey(format!("HMAC key rejected: {e}")))?;
    mac.update(data);
    let tag = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&tag);
    Ok(out)
}

/// HMAC-SHA256 as lowercase hex, truncated to `hex_len` characters.
pub fn hmac_sha256_hex(
    key: &[u8],
    data: &[u8],
    hex_len: usize,
) -> Result<String, RedemptionError> {
    let mut hex = bytes_to_hex(&hmac_sha256(key, data)?);
    hex.truncate(hex_len);
    Ok(hex)
}

/// Constant-time equality. Inputs of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
