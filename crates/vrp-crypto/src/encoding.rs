//! # Byte Encodings
//!
//! Lowercase hex for signature components and digests, and unpadded
//! base64url for token segments.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use vrp_core::RedemptionError;

/// Render bytes as a lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case) into bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    if !hex.is_ascii() {
        return Err("hex string must be ASCII".to_string());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

/// Encode bytes as base64url without padding.
pub fn base64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url. Padding and non-canonical trailing bits are
/// rejected.
pub fn base64url_decode(segment: &str) -> Result<Vec<u8>, RedemptionError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| RedemptionError::invalid_token(format!("invalid base64url segment: {e}")))
}
