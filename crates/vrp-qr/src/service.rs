//! # QR Service
//!
//! Orchestrates the claims builder, the token codec and the claims validator
//! into the QR issuance and redemption flow:
//!
//! ```text
//! generate ──► issued ──► validate ──► valid + voucher info | invalid + reason
//!                 │
//!                 ├──► check_expiration ──► warning
//!                 └──► refresh (user only) ──► issued
//! ```
//!
//! ## Result Policy
//!
//! Validation never leaks internal error text. Every rejection carries one
//! of a fixed set of client-safe reasons; only infrastructure failures
//! (malformed or mismatched key material) propagate as errors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_claims::{
    extract_voucher_info, ClaimsBuilder, ClaimsValidator, PrintClaimsOptions, RedemptionClaims,
    UserClaimsOptions, VoucherGrant, VoucherInfo,
};
use vrp_core::temporal::from_epoch_secs;
use vrp_core::{
    BatchCode, ErrorContext, RedemptionConfig, RedemptionError, SharedClock, SystemClock,
    TokenType, UserId, Verdict, VoucherId,
};
use vrp_token::codec::is_well_formed;
use vrp_token::{SignOptions, TokenCodec};

use crate::metadata::QrMetadata;

pub(crate) const MSG_MALFORMED: &str = "Invalid QR payload format";
pub(crate) const MSG_SIGNATURE: &str = "Invalid signature";
pub(crate) const MSG_ALGORITHM: &str = "Unsupported token algorithm";
pub(crate) const MSG_TOKEN: &str = "Invalid token";
pub(crate) const MSG_EXPIRED: &str = "Token expired";
pub(crate) const MSG_USER_REQUIRED: &str = "User voucher required";
pub(crate) const MSG_PRINT_REQUIRED: &str = "Print voucher required";

/// A freshly issued QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQr {
    /// Compact token to encode into the QR symbol.
    pub qr_payload: String,
    /// Claims exactly as signed.
    pub claims: RedemptionClaims,
    pub expires_at: Option<DateTime<Utc>>,
    pub metadata: QrMetadata,
}

/// Options for [`QrService::validate_qr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Return the claims of an authentic but expired token for display. The
    /// result is still not valid.
    pub allow_expired: bool,
    pub require_user_voucher: bool,
    pub require_print_voucher: bool,
}

/// Outcome of [`QrService::validate_qr`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrValidation {
    pub valid: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<RedemptionClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_info: Option<VoucherInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QrValidation {
    fn accepted(claims: RedemptionClaims) -> Self {
        Self {
            valid: true,
            expired: false,
            voucher_info: Some(extract_voucher_info(&claims)),
            claims: Some(claims),
            error: None,
        }
    }

    fn rejected(reason: &str) -> Self {
        Self {
            valid: false,
            expired: false,
            claims: None,
            voucher_info: None,
            error: Some(reason.to_string()),
        }
    }

    fn expired(claims: Option<RedemptionClaims>) -> Self {
        Self {
            valid: false,
            expired: true,
            voucher_info: claims.as_ref().map(extract_voucher_info),
            claims,
            error: Some(MSG_EXPIRED.to_string()),
        }
    }
}

/// Options for [`QrService::refresh_qr`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Lifetime of the new token; the configured user TTL otherwise.
    pub ttl_secs: Option<i64>,
    /// Carry the original `jti` over instead of minting a new one.
    pub preserve_nonce: bool,
}

/// QR issuance and redemption for one issuer configuration.
#[derive(Clone)]
pub struct QrService {
    pub(crate) codec: TokenCodec,
    pub(crate) builder: ClaimsBuilder,
    pub(crate) validator: ClaimsValidator,
}

impl std::fmt::Debug for QrService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrService")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl QrService {
    pub fn new(config: RedemptionConfig, clock: SharedClock) -> Result<Self, RedemptionError> {
        let builder = ClaimsBuilder::new(&config, clock.clone());
        let validator = ClaimsValidator::new(clock.clone());
        let codec = TokenCodec::new(config, clock)?;
        Ok(Self {
            codec,
            builder,
            validator,
        })
    }

    /// A service reading wall-clock time.
    pub fn with_system_clock(config: RedemptionConfig) -> Result<Self, RedemptionError> {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &RedemptionConfig {
        self.codec.config()
    }

    /// Issue a QR payload for a voucher claimed by `user_id`.
    ///
    /// `options.jti` pins the nonce for idempotent re-issuance.
    pub fn generate_user_voucher_qr(
        &self,
        voucher_id: &VoucherId,
        user_id: &UserId,
        private_key_pem: &str,
        options: &UserClaimsOptions,
    ) -> Result<GeneratedQr, RedemptionError> {
        let claims = self
            .builder
            .create_user_voucher_claims(voucher_id, user_id, options)?;
        let sign = SignOptions {
            ttl_secs: Some(self.builder.user_ttl(options)),
            jti: options.jti.clone(),
        };
        self.sign(claims, private_key_pem, &sign).map_err(|e| {
            e.with_context(ErrorContext::user(voucher_id.as_str(), user_id.as_str()))
        })
    }

    /// Issue a QR payload for a voucher in print batch `batch_code`.
    pub fn generate_print_voucher_qr(
        &self,
        voucher_id: &VoucherId,
        batch_code: &BatchCode,
        private_key_pem: &str,
        options: &PrintClaimsOptions,
    ) -> Result<GeneratedQr, RedemptionError> {
        let claims = self
            .builder
            .create_print_voucher_claims(voucher_id, batch_code, options)?;
        let sign = SignOptions {
            ttl_secs: Some(self.builder.print_ttl(options)),
            jti: options.jti.clone(),
        };
        self.sign(claims, private_key_pem, &sign).map_err(|e| {
            e.with_context(ErrorContext::print(voucher_id.as_str(), batch_code.as_str()))
        })
    }

    fn sign(
        &self,
        claims: RedemptionClaims,
        private_key_pem: &str,
        options: &SignOptions,
    ) -> Result<GeneratedQr, RedemptionError> {
        let token_type = claims.custom.typ;
        let signed = self.codec.issue_token(claims, private_key_pem, options)?;
        let metadata = QrMetadata::for_payload(&signed.token, token_type);
        tracing::debug!(
            voucher_id = %signed.claims.custom.vid,
            token_type = %token_type,
            byte_size = metadata.byte_size,
            "generated QR payload"
        );
        Ok(GeneratedQr {
            expires_at: signed.claims.registered.exp.and_then(from_epoch_secs),
            qr_payload: signed.token,
            claims: signed.claims,
            metadata,
        })
    }

    /// Authoritatively validate a scanned payload.
    pub fn validate_qr(
        &self,
        payload: &str,
        public_key_pem: &str,
        options: &ValidateOptions,
    ) -> Result<QrValidation, RedemptionError> {
        if !is_well_formed(payload) {
            return Ok(QrValidation::rejected(MSG_MALFORMED));
        }

        let verdict = match self
            .codec
            .verify_token::<VoucherGrant>(payload, public_key_pem)
        {
            Ok(verdict) => verdict,
            Err(e) if e.is_infrastructure() => return Err(e),
            Err(e) => {
                tracing::debug!(code = e.code(), "QR payload rejected");
                return Ok(QrValidation::rejected(rejection_message(&e)));
            }
        };

        let claims = match verdict {
            Verdict::Valid(claims) => claims,
            Verdict::Expired { .. } => return Ok(self.expired_result(payload, None, options)),
            Verdict::Invalid(reason) => return Ok(QrValidation::rejected(&reason)),
        };

        match self.validator.validate_redemption_claims(&claims) {
            Verdict::Valid(()) => {}
            Verdict::Expired { .. } => {
                return Ok(self.expired_result(payload, Some(claims), options));
            }
            Verdict::Invalid(reason) => return Ok(QrValidation::rejected(&reason)),
        }

        if options.require_user_voucher && claims.custom.typ != TokenType::User {
            return Ok(QrValidation::rejected(MSG_USER_REQUIRED));
        }
        if options.require_print_voucher && claims.custom.typ != TokenType::Print {
            return Ok(QrValidation::rejected(MSG_PRINT_REQUIRED));
        }

        tracing::debug!(
            voucher_id = %claims.custom.vid,
            token_type = %claims.custom.typ,
            "QR payload accepted"
        );
        Ok(QrValidation::accepted(claims))
    }

    /// Expired tokens are never valid. With `allow_expired` the claims are
    /// returned for display, read without re-verification when the codec
    /// stopped before handing them over.
    fn expired_result(
        &self,
        payload: &str,
        claims: Option<RedemptionClaims>,
        options: &ValidateOptions,
    ) -> QrValidation {
        if !options.allow_expired {
            return QrValidation::expired(None);
        }
        let claims = claims.or_else(|| {
            self.codec
                .decode_token::<VoucherGrant>(payload)
                .map(|decoded| decoded.claims)
        });
        QrValidation::expired(claims)
    }

    /// Re-issue a user-voucher payload with a fresh `iat` and lifetime.
    ///
    /// The old payload is only decoded, not verified: callers must have
    /// authenticated the holder. Payloads that cannot be refreshed (print
    /// vouchers, undecodable input, user vouchers without a user ID) yield
    /// `None`. Errors are reserved for signing and key failures.
    pub fn refresh_qr(
        &self,
        payload: &str,
        private_key_pem: &str,
        options: &RefreshOptions,
    ) -> Result<Option<GeneratedQr>, RedemptionError> {
        let Some(decoded) = self.codec.decode_token::<VoucherGrant>(payload) else {
            tracing::debug!("refresh refused for undecodable payload");
            return Ok(None);
        };
        let grant = decoded.claims.custom;
        let user_id = match (grant.typ, grant.uid) {
            (TokenType::User, Some(user_id)) => user_id,
            (TokenType::User, None) => {
                tracing::debug!(
                    voucher_id = %grant.vid,
                    "refresh refused for user voucher without user ID"
                );
                return Ok(None);
            }
            (TokenType::Print, _) => {
                tracing::debug!(voucher_id = %grant.vid, "refresh refused for print voucher");
                return Ok(None);
            }
        };
        let claims_options = UserClaimsOptions {
            ttl_secs: options.ttl_secs,
            jti: options
                .preserve_nonce
                .then_some(decoded.claims.registered.jti),
        };
        self.generate_user_voucher_qr(&grant.vid, &user_id, private_key_pem, &claims_options)
            .map(Some)
    }
}

fn rejection_message(err: &RedemptionError) -> &'static str {
    match err {
        RedemptionError::InvalidSignature(_) => MSG_SIGNATURE,
        RedemptionError::AlgorithmMismatch { .. } => MSG_ALGORITHM,
        RedemptionError::InvalidToken { .. } | RedemptionError::Serialization(_) => MSG_MALFORMED,
        _ => MSG_TOKEN,
    }
}
