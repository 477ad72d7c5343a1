//! # Payload Introspection
//!
//! Decode-only views of a payload for display and warnings. Nothing here
//! verifies a signature; never base an authorization decision on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_claims::VoucherGrant;
use vrp_core::temporal::from_epoch_secs;
use vrp_core::{BatchCode, TokenType, UserId, VoucherId};

use crate::metadata::QrMetadata;
use crate::service::QrService;

/// Expiry status of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationStatus {
    /// Seconds left, clamped at zero. `None` when the token has no `exp`.
    pub remaining_secs: Option<i64>,
    pub is_expired: bool,
    /// Live but within the warning threshold.
    pub near_expiry: bool,
}

/// Unverified description of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrIntrospection {
    pub voucher_id: VoucherId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<BatchCode>,
    pub token_type: TokenType,
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ttl: Option<i64>,
    pub metadata: QrMetadata,
}

impl QrService {
    /// Remaining lifetime of a payload against `threshold_secs` (the
    /// configured near-expiry threshold when `None`). `None` when the payload
    /// does not decode.
    pub fn check_expiration(
        &self,
        payload: &str,
        threshold_secs: Option<i64>,
    ) -> Option<ExpirationStatus> {
        let claims = self.codec.decode_token::<VoucherGrant>(payload)?.claims;
        let threshold = threshold_secs.unwrap_or(self.config().near_expiry_threshold_secs);
        let now = self.codec.clock().now_secs();
        Some(ExpirationStatus {
            remaining_secs: claims.remaining_ttl(now),
            is_expired: claims.is_expired_at(now),
            near_expiry: self.validator.is_near_expiration(&claims, threshold),
        })
    }

    /// Describe a payload without verifying it. `None` when it does not
    /// decode.
    pub fn extract_qr_metadata(&self, payload: &str) -> Option<QrIntrospection> {
        let claims = self.codec.decode_token::<VoucherGrant>(payload)?.claims;
        let now = self.codec.clock().now_secs();
        let registered = &claims.registered;
        Some(QrIntrospection {
            is_expired: claims.is_expired_at(now),
            remaining_ttl: claims.remaining_ttl(now),
            issued_at: from_epoch_secs(registered.iat).unwrap_or_default(),
            expires_at: registered.exp.and_then(from_epoch_secs),
            jti: registered.jti.clone(),
            metadata: QrMetadata::for_payload(payload, claims.custom.typ),
            token_type: claims.custom.typ,
            voucher_id: claims.custom.vid,
            user_id: claims.custom.uid,
            batch_code: claims.custom.btc,
        })
    }
}
