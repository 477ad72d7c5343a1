//! # Claims Builder
//!
//! Assembles fresh claim sets for the two redemption channels. Every build
//! reads the clock anew; claims are never reused across issuances.

use vrp_core::{
    BatchCode, ErrorContext, RedemptionConfig, RedemptionError, SharedClock, TokenType, UserId,
    VoucherId,
};
use vrp_token::Claims;

use crate::grant::{RedemptionClaims, VoucherGrant};

/// Options for a user-voucher claim set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserClaimsOptions {
    /// Lifetime override; the configured user TTL otherwise.
    pub ttl_secs: Option<i64>,
    /// Caller-supplied nonce for idempotent re-issuance.
    pub jti: Option<String>,
}

/// Options for a print-voucher claim set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintClaimsOptions {
    /// Lifetime override; the configured print TTL otherwise.
    pub ttl_secs: Option<i64>,
    /// Redemption limit.
    pub limit: Option<u32>,
    /// Caller-supplied nonce for idempotent re-issuance.
    pub jti: Option<String>,
}

/// Builds [`RedemptionClaims`] with `iat`/`exp` taken from an injected
/// clock.
#[derive(Clone)]
pub struct ClaimsBuilder {
    user_ttl_secs: i64,
    print_ttl_secs: i64,
    clock: SharedClock,
}

impl ClaimsBuilder {
    pub fn new(config: &RedemptionConfig, clock: SharedClock) -> Self {
        Self {
            user_ttl_secs: config.user_ttl_secs,
            print_ttl_secs: config.print_ttl_secs,
            clock,
        }
    }

    /// Effective lifetime of a user voucher issued with `options`.
    pub fn user_ttl(&self, options: &UserClaimsOptions) -> i64 {
        options.ttl_secs.unwrap_or(self.user_ttl_secs)
    }

    /// Effective lifetime of a print voucher issued with `options`.
    pub fn print_ttl(&self, options: &PrintClaimsOptions) -> i64 {
        options.ttl_secs.unwrap_or(self.print_ttl_secs)
    }

    /// Claims for a voucher claimed by `user_id`.
    pub fn create_user_voucher_claims(
        &self,
        voucher_id: &VoucherId,
        user_id: &UserId,
        options: &UserClaimsOptions,
    ) -> Result<RedemptionClaims, RedemptionError> {
        let context = ErrorContext::user(voucher_id.as_str(), user_id.as_str());
        if voucher_id.is_blank() || user_id.is_blank() {
            return Err(RedemptionError::InvalidToken {
                reason: "user voucher requires voucher and user identifiers".into(),
                context,
            });
        }
        let grant = VoucherGrant {
            vid: voucher_id.clone(),
            uid: Some(user_id.clone()),
            typ: TokenType::User,
            btc: None,
            lim: None,
        };
        self.stamp(grant, self.user_ttl(options), options.jti.clone())
            .map_err(|e| e.with_context(context))
    }

    /// Claims for a voucher distributed in print batch `batch_code`.
    pub fn create_print_voucher_claims(
        &self,
        voucher_id: &VoucherId,
        batch_code: &BatchCode,
        options: &PrintClaimsOptions,
    ) -> Result<RedemptionClaims, RedemptionError> {
        let context = ErrorContext::print(voucher_id.as_str(), batch_code.as_str());
        if voucher_id.is_blank() || batch_code.is_blank() {
            return Err(RedemptionError::InvalidToken {
                reason: "print voucher requires voucher and batch identifiers".into(),
                context,
            });
        }
        let grant = VoucherGrant {
            vid: voucher_id.clone(),
            uid: None,
            typ: TokenType::Print,
            btc: Some(batch_code.clone()),
            lim: options.limit,
        };
        self.stamp(grant, self.print_ttl(options), options.jti.clone())
            .map_err(|e| e.with_context(context))
    }

    fn stamp(
        &self,
        grant: VoucherGrant,
        ttl_secs: i64,
        jti: Option<String>,
    ) -> Result<RedemptionClaims, RedemptionError> {
        if ttl_secs <= 0 {
            return Err(RedemptionError::invalid_token(format!(
                "lifetime must be positive, got {ttl_secs}"
            )));
        }
        let now = self.clock.now_secs();
        let mut claims = Claims::new(grant);
        claims.registered.iat = now;
        claims.registered.exp = Some(now.saturating_add(ttl_secs));
        if let Some(jti) = jti {
            claims.registered.jti = jti;
        }
        Ok(claims)
    }
}
