//! # Voucher Grant
//!
//! Application claims of a redemption token and their client-facing
//! projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_core::temporal::from_epoch_secs;
use vrp_core::{BatchCode, TokenType, UserId, VoucherId};
use vrp_token::Claims;

/// Voucher claims flattened next to the registered claims on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherGrant {
    /// Voucher identifier.
    pub vid: VoucherId,
    /// Bound user, required for `user` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<UserId>,
    /// Redemption channel.
    pub typ: TokenType,
    /// Print batch, required for `print` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btc: Option<BatchCode>,
    /// Redemption limit for print vouchers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lim: Option<u32>,
}

/// The full claim set of a redemption token.
pub type RedemptionClaims = Claims<VoucherGrant>;

/// What a client or the voucher domain service needs to know about a
/// verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherInfo {
    pub voucher_id: VoucherId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<BatchCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Project claims into a [`VoucherInfo`].
pub fn extract_voucher_info(claims: &RedemptionClaims) -> VoucherInfo {
    let grant = &claims.custom;
    VoucherInfo {
        voucher_id: grant.vid.clone(),
        user_id: grant.uid.clone(),
        token_type: grant.typ,
        batch_code: grant.btc.clone(),
        usage_limit: grant.lim,
        issued_at: from_epoch_secs(claims.registered.iat).unwrap_or_default(),
        expires_at: claims.registered.exp.and_then(from_epoch_secs),
    }
}
