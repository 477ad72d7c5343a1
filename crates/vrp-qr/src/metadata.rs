//! # Payload Metadata
//!
//! Descriptive sizing hints for rendering a payload as a QR symbol. Nothing
//! here is authoritative: it is derived from the payload length alone.

use serde::{Deserialize, Serialize};
use vrp_core::TokenType;

/// Byte-mode capacity of QR versions 1 through 40 at error-correction
/// level M.
const BYTE_CAPACITY_LEVEL_M: [usize; 40] = [
    14, 26, 42, 62, 84, 106, 122, 152, 180, 213, 251, 287, 331, 362, 412, 450, 504, 560, 624, 666,
    711, 779, 857, 911, 997, 1059, 1125, 1190, 1264, 1370, 1452, 1538, 1628, 1722, 1809, 1911,
    1989, 2099, 2213, 2331,
];

/// Highest QR version still considered comfortable for phone cameras.
const MOBILE_MAX_VERSION: u8 = 10;

/// Density bucket of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Complexity {
    /// Bucket for a payload of `byte_size` bytes.
    pub fn for_size(byte_size: usize) -> Self {
        match byte_size {
            0..=150 => Self::Low,
            151..=300 => Self::Medium,
            301..=500 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    /// Rough time for a phone camera to lock onto a symbol of this density.
    pub fn estimated_scan_time_ms(&self) -> u32 {
        match self {
            Self::Low => 200,
            Self::Medium => 350,
            Self::High => 500,
            Self::VeryHigh => 800,
        }
    }
}

/// Sizing hints for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrMetadata {
    pub token_type: TokenType,
    pub byte_size: usize,
    pub complexity: Complexity,
    /// Smallest QR version holding the payload at level M; `None` when the
    /// payload exceeds version 40.
    pub qr_code_version: Option<u8>,
    pub estimated_scan_time_ms: u32,
    pub mobile_optimized: bool,
}

impl QrMetadata {
    /// Derive metadata from the payload string.
    pub fn for_payload(payload: &str, token_type: TokenType) -> Self {
        let byte_size = payload.len();
        let complexity = Complexity::for_size(byte_size);
        let qr_code_version = qr_version_for(byte_size);
        Self {
            token_type,
            byte_size,
            complexity,
            qr_code_version,
            estimated_scan_time_ms: complexity.estimated_scan_time_ms(),
            mobile_optimized: qr_code_version.is_some_and(|v| v <= MOBILE_MAX_VERSION),
        }
    }
}

/// Smallest QR version whose level-M byte capacity fits `byte_size`.
pub fn qr_version_for(byte_size: usize) -> Option<u8> {
    BYTE_CAPACITY_LEVEL_M
        .iter()
        .position(|&capacity| byte_size <= capacity)
        .and_then(|idx| u8::try_from(idx + 1).ok())
}
