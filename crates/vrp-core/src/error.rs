//! # Error Types — Redemption Error Taxonomy
//!
//! Defines the error type shared by every layer of the redemption core.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Propagation Policy
//!
//! - Infrastructure and authenticity failures (malformed keys, malformed
//!   token structure, algorithm confusion, bad signatures) are errors.
//! - Anything a caller branches on programmatically (wrong audience, wrong
//!   voucher type, missing claims, expiry) is a [`Verdict`](crate::Verdict),
//!   not an error.
//! - `TokenExpired` exists for callers that convert a verdict into a
//!   `Result` with [`Verdict::into_result`](crate::Verdict::into_result).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifiers attached to a wrapped failure so logs and audit records can
/// tell which voucher the failure belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<String>,
}

impl ErrorContext {
    /// Context for a user-bound voucher.
    pub fn user(voucher_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            voucher_id: Some(voucher_id.into()),
            user_id: Some(user_id.into()),
            batch_code: None,
        }
    }

    /// Context for a print/batch voucher.
    pub fn print(voucher_id: impl Into<String>, batch_code: impl Into<String>) -> Self {
        Self {
            voucher_id: Some(voucher_id.into()),
            user_id: None,
            batch_code: Some(batch_code.into()),
        }
    }

    /// True when no identifier is attached.
    pub fn is_empty(&self) -> bool {
        self.voucher_id.is_none() && self.user_id.is_none() && self.batch_code.is_none()
    }
}

/// Top-level error type for voucher redemption proofs.
#[derive(Error, Debug)]
pub enum RedemptionError {
    /// Key material could not be parsed for the configured curve, or a
    /// secret does not meet the minimum length.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// The signature segment is malformed or does not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Malformed token structure, unsupported algorithm, or a wrapped
    /// generation failure.
    #[error("invalid token: {reason}")]
    InvalidToken {
        /// Human-readable reason.
        reason: String,
        /// Identifiers of the voucher involved, when known.
        context: ErrorContext,
    },

    /// The token's `exp` claim lies in the past.
    #[error("token expired at {expired_at}")]
    TokenExpired {
        /// Unix seconds of the `exp` claim.
        expired_at: i64,
    },

    /// Token header `alg` disagrees with the configured algorithm.
    #[error("algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch {
        /// Configured algorithm.
        expected: String,
        /// Algorithm found in the token header or key.
        found: String,
    },

    /// Key material or signature belongs to a different curve.
    #[error("curve mismatch: expected {expected}, found {found}")]
    CurveMismatch {
        /// Configured curve.
        expected: String,
        /// Curve found in the material.
        found: String,
    },

    /// Provisioning-time key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Provisioning-time key rotation failed.
    #[error("key rotation failed: {0}")]
    KeyRotationFailed(String),

    /// Configuration is missing or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The record store failed.
    #[error("record store error: {0}")]
    Store(String),

    /// Batch short-code generation ran out of attempts for a voucher.
    #[error("no unique short code for voucher {voucher_id} after {attempts} attempts")]
    BatchExhausted {
        /// Voucher whose retry budget ran out.
        voucher_id: String,
        /// Attempts made.
        attempts: u32,
    },

    /// A batch entry is not a print voucher of the batch being generated.
    #[error("voucher {voucher_id} does not belong to print batch {batch_code}")]
    BatchMismatch {
        /// Offending voucher.
        voucher_id: String,
        /// Batch being generated.
        batch_code: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedemptionError {
    /// An `InvalidToken` error without voucher context.
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    /// Attach voucher context. Non-`InvalidToken` errors are wrapped into
    /// `InvalidToken`, keeping the original message as the reason.
    pub fn with_context(self, context: ErrorContext) -> Self {
        match self {
            Self::InvalidToken { reason, .. } => Self::InvalidToken { reason, context },
            other => Self::InvalidToken {
                reason: other.to_string(),
                context,
            },
        }
    }

    /// Stable machine-readable code for logs and audit records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::InvalidSignature(_) => "INVALID_SIGNATURE",
            Self::InvalidToken { .. } => "INVALID_TOKEN",
            Self::TokenExpired { .. } => "TOKEN_EXPIRED",
            Self::AlgorithmMismatch { .. } => "ALGORITHM_MISMATCH",
            Self::CurveMismatch { .. } => "CURVE_MISMATCH",
            Self::KeyGenerationFailed(_) => "KEY_GENERATION_FAILED",
            Self::KeyRotationFailed(_) => "KEY_ROTATION_FAILED",
            Self::Config(_) => "CONFIG",
            Self::Store(_) => "STORE",
            Self::BatchExhausted { .. } => "BATCH_EXHAUSTED",
            Self::BatchMismatch { .. } => "BATCH_MISMATCH",
            Self::Serialization(_) => "SERIALIZATION",
        }
    }

    /// Errors that mean the environment is broken rather than the presented
    /// token: callers propagate these instead of reporting "invalid".
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_)
                | Self::CurveMismatch { .. }
                | Self::Config(_)
                | Self::KeyGenerationFailed(_)
                | Self::KeyRotationFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_token_display() {
        let err = RedemptionError::invalid_token("expected 3 segments");
        assert_eq!(format!("{err}"), "invalid token: expected 3 segments");
        assert_eq!(err.code(), "INVALID_TOKEN");
    }

    #[test]
    fn with_context_keeps_reason() {
        let err = RedemptionError::invalid_token("bad")
            .with_context(ErrorContext::user("v-1", "u-1"));
        match err {
            RedemptionError::InvalidToken { reason, context } => {
                assert_eq!(reason, "bad");
                assert_eq!(context.voucher_id.as_deref(), Some("v-1"));
                assert_eq!(context.user_id.as_deref(), Some("u-1"));
                assert!(context.batch_code.is_none());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn with_context_wraps_other_variants() {
        let err = RedemptionError::InvalidKey("not pem".into())
            .with_context(ErrorContext::print("v-2", "B-7"));
        match err {
            RedemptionError::InvalidToken { reason, context } => {
                assert!(reason.contains("not pem"));
                assert_eq!(context.batch_code.as_deref(), Some("B-7"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn algorithm_mismatch_display() {
        let err = RedemptionError::AlgorithmMismatch {
            expected: "ES256".into(),
            found: "HS256".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("ES256"));
        assert!(msg.contains("HS256"));
    }

    #[test]
    fn infrastructure_classification() {
        assert!(RedemptionError::InvalidKey("x".into()).is_infrastructure());
        assert!(RedemptionError::CurveMismatch {
            expected: "P-256".into(),
            found: "P-384".into(),
        }
        .is_infrastructure());
        assert!(!RedemptionError::InvalidSignature("x".into()).is_infrastructure());
        assert!(!RedemptionError::TokenExpired { expired_at: 0 }.is_infrastructure());
    }

    #[test]
    fn batch_mismatch_names_voucher_and_batch() {
        let err = RedemptionError::BatchMismatch {
            voucher_id: "v-3".into(),
            batch_code: "B-2".into(),
        };
        assert_eq!(
            format!("{err}"),
            "voucher v-3 does not belong to print batch B-2"
        );
        assert_eq!(err.code(), "BATCH_MISMATCH");
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn empty_context_serializes_to_empty_object() {
        let json = serde_json::to_string(&ErrorContext::default()).unwrap();
        assert_eq!(json, "{}");
        assert!(ErrorContext::default().is_empty());
    }
}
