//! # Short-Code Engine
//!
//! Issues short codes for claim snapshots and redeems them.
//!
//! ## Security Invariant
//!
//! A short code is only a lookup key. What makes a redemption authentic is
//! the stored integrity anchor: an HMAC under the engine secret that the
//! engine recomputes and compares in constant time on every validation.
//! Checksum and code comparisons are constant-time as well.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_claims::{extract_voucher_info, ClaimsValidator, RedemptionClaims, VoucherInfo};
use vrp_core::{
    BatchCode, RedemptionError, SharedClock, ShortCodeConfig, SystemClock, TokenType, Verdict,
    VoucherId,
};
use vrp_crypto::constant_time_eq;

use crate::code::{derive_code, integrity_anchor, normalize_checksum, normalize_code};
use crate::store::RecordStore;

/// Key prefix of records in the store.
pub const KEY_PREFIX: &str = "shortcode:";

/// Per-voucher attempt budget in batch generation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

const MSG_FORMAT: &str = "Invalid short code format";
const MSG_NOT_FOUND: &str = "Short code not found";
const MSG_CHECKSUM: &str = "Invalid checksum";
const MSG_INTEGRITY: &str = "Short code integrity check failed";
const MSG_EXPIRED: &str = "Token expired";
const MSG_USER_REQUIRED: &str = "User voucher required";
const MSG_PRINT_REQUIRED: &str = "Print voucher required";

/// What the store holds for one code. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortCodeRecord {
    pub formatted_code: String,
    pub checksum: String,
    /// Integrity anchor over `formatted_code:checksum`.
    pub hmac: String,
    /// Claims captured at generation time.
    pub claims: RedemptionClaims,
    pub created_at: DateTime<Utc>,
}

/// A code handed out to a holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortCode {
    /// `XXXX-XXXX`.
    pub code: String,
    pub checksum: String,
    /// Lifetime of the stored record.
    pub ttl_secs: i64,
}

/// Options for [`ShortCodeEngine::validate_short_code`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortCodeValidateOptions {
    /// Checksum entered by the holder, if the channel collects one.
    pub checksum: Option<String>,
    /// Return the snapshot of an expired record for display. The result is
    /// still not valid.
    pub allow_expired: bool,
    /// Required voucher type.
    pub expected_type: Option<TokenType>,
}

/// Outcome of [`ShortCodeEngine::validate_short_code`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortCodeValidation {
    pub valid: bool,
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<RedemptionClaims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_info: Option<VoucherInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShortCodeValidation {
    fn rejected(reason: &str) -> Self {
        Self {
            valid: false,
            expired: false,
            claims: None,
            voucher_info: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Options for [`ShortCodeEngine::generate_batch_short_codes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Attempts per voucher before the batch fails.
    pub max_attempts: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// One voucher's code within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub voucher_id: VoucherId,
    pub short_code: ShortCode,
    /// Attempt that produced the code.
    pub attempt: u32,
}

/// Result of a batch generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_code: BatchCode,
    pub codes: Vec<BatchEntry>,
    /// Derivations discarded because the code was already used in the
    /// batch.
    pub duplicates: u32,
}

/// Issues and redeems short codes against a [`RecordStore`].
pub struct ShortCodeEngine {
    config: ShortCodeConfig,
    store: Arc<dyn RecordStore>,
    clock: SharedClock,
    validator: ClaimsValidator,
}

impl std::fmt::Debug for ShortCodeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortCodeEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ShortCodeEngine {
    /// Create an engine. Fails with `InvalidKey` when the secret is shorter
    /// than 32 characters.
    pub fn new(
        config: ShortCodeConfig,
        store: Arc<dyn RecordStore>,
        clock: SharedClock,
    ) -> Result<Self, RedemptionError> {
        config.validate()?;
        Ok(Self {
            validator: ClaimsValidator::new(clock.clone()),
            config,
            store,
            clock,
        })
    }

    /// An engine reading wall-clock time.
    pub fn with_system_clock(
        config: ShortCodeConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, RedemptionError> {
        Self::new(config, store, Arc::new(SystemClock))
    }

    fn secret(&self) -> &[u8] {
        self.config.secret.as_bytes()
    }

    /// Record lifetime for `claims`: their remaining lifetime, at least one
    /// second, or the configured default when they carry no `exp`.
    fn record_ttl(&self, claims: &RedemptionClaims) -> i64 {
        match claims.registered.exp {
            Some(exp) => (exp - self.clock.now_secs()).max(1),
            None => self.config.default_ttl_secs,
        }
    }

    /// Derive the code for `claims` on `attempt` and persist its record.
    pub async fn create_short_code(
        &self,
        claims: &RedemptionClaims,
        attempt: u32,
    ) -> Result<ShortCode, RedemptionError> {
        let derived = derive_code(self.secret(), claims, attempt)?;
        let hmac = integrity_anchor(self.secret(), &derived.formatted, &derived.checksum)?;
        let record = ShortCodeRecord {
            formatted_code: derived.formatted.clone(),
            checksum: derived.checksum.clone(),
            hmac,
            claims: claims.clone(),
            created_at: self.clock.now(),
        };
        let ttl_secs = self.record_ttl(claims);
        let key = format!("{KEY_PREFIX}{}", derived.formatted);
        self.store
            .set(&key, serde_json::to_string(&record)?, ttl_secs)
            .await?;

        tracing::debug!(
            voucher_id = %claims.custom.vid,
            attempt,
            ttl_secs,
            "stored short code"
        );
        Ok(ShortCode {
            code: derived.formatted,
            checksum: derived.checksum,
            ttl_secs,
        })
    }

    async fn load(&self, code: &str) -> Option<ShortCodeRecord> {
        let key = format!("{KEY_PREFIX}{code}");
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "short-code store read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable short-code record");
                None
            }
        }
    }

    /// Redeem-side check of a code entered by a holder.
    pub async fn validate_short_code(
        &self,
        input: &str,
        options: &ShortCodeValidateOptions,
    ) -> ShortCodeValidation {
        let Some(code) = normalize_code(input) else {
            return ShortCodeValidation::rejected(MSG_FORMAT);
        };
        let Some(record) = self.load(&code).await else {
            return ShortCodeValidation::rejected(MSG_NOT_FOUND);
        };

        if let Some(entered) = &options.checksum {
            let matches = normalize_checksum(entered).is_some_and(|entered| {
                constant_time_eq(entered.as_bytes(), record.checksum.as_bytes())
            });
            if !matches {
                return ShortCodeValidation::rejected(MSG_CHECKSUM);
            }
        }

        let anchor_ok = match integrity_anchor(self.secret(), &code, &record.checksum) {
            Ok(expected) => {
                constant_time_eq(expected.as_bytes(), record.hmac.as_bytes())
                    & constant_time_eq(code.as_bytes(), record.formatted_code.as_bytes())
            }
            Err(_) => false,
        };
        if !anchor_ok {
            tracing::warn!(voucher_id = %record.claims.custom.vid, "short-code integrity failure");
            return ShortCodeValidation::rejected(MSG_INTEGRITY);
        }

        match self.validator.validate_redemption_claims(&record.claims) {
            Verdict::Valid(()) => {}
            Verdict::Expired { .. } => {
                let claims = options.allow_expired.then_some(record.claims);
                return ShortCodeValidation {
                    valid: false,
                    expired: true,
                    voucher_info: claims.as_ref().map(extract_voucher_info),
                    claims,
                    error: Some(MSG_EXPIRED.to_string()),
                };
            }
            Verdict::Invalid(reason) => return ShortCodeValidation::rejected(&reason),
        }

        match options.expected_type {
            Some(TokenType::User) if record.claims.custom.typ != TokenType::User => {
                return ShortCodeValidation::rejected(MSG_USER_REQUIRED);
            }
            Some(TokenType::Print) if record.claims.custom.typ != TokenType::Print => {
                return ShortCodeValidation::rejected(MSG_PRINT_REQUIRED);
            }
            _ => {}
        }

        ShortCodeValidation {
            valid: true,
            expired: false,
            voucher_info: Some(extract_voucher_info(&record.claims)),
            claims: Some(record.claims),
            error: None,
        }
    }

    /// Generate one code per voucher, unique within the batch.
    ///
    /// Every entry must be a print voucher stamped with `batch_code`;
    /// otherwise the call fails with `BatchMismatch` before anything is
    /// stored.
    ///
    /// A derivation that collides with a code already issued in this batch
    /// is retried with the next attempt number, up to
    /// [`BatchOptions::max_attempts`] per voucher.
    pub async fn generate_batch_short_codes(
        &self,
        vouchers: &[RedemptionClaims],
        batch_code: &BatchCode,
        options: &BatchOptions,
    ) -> Result<BatchResult, RedemptionError> {
        if let Some(stray) = vouchers.iter().find(|claims| {
            claims.custom.typ != TokenType::Print || claims.custom.btc.as_ref() != Some(batch_code)
        }) {
            tracing::warn!(
                batch_code = %batch_code,
                voucher_id = %stray.custom.vid,
                "voucher does not belong to batch"
            );
            return Err(RedemptionError::BatchMismatch {
                voucher_id: stray.custom.vid.to_string(),
                batch_code: batch_code.to_string(),
            });
        }

        let mut used = HashSet::with_capacity(vouchers.len());
        let mut codes = Vec::with_capacity(vouchers.len());
        let mut duplicates = 0u32;

        for claims in vouchers {
            let mut issued = None;
            for attempt in 0..options.max_attempts {
                let derived = derive_code(self.secret(), claims, attempt)?;
                if used.contains(&derived.formatted) {
                    duplicates += 1;
                    continue;
                }
                let short_code = self.create_short_code(claims, attempt).await?;
                used.insert(short_code.code.clone());
                issued = Some(BatchEntry {
                    voucher_id: claims.custom.vid.clone(),
                    short_code,
                    attempt,
                });
                break;
            }
            match issued {
                Some(entry) => codes.push(entry),
                None => {
                    tracing::warn!(
                        batch_code = %batch_code,
                        voucher_id = %claims.custom.vid,
                        "short-code attempt budget exhausted"
                    );
                    return Err(RedemptionError::BatchExhausted {
                        voucher_id: claims.custom.vid.to_string(),
                        attempts: options.max_attempts,
                    });
                }
            }
        }

        tracing::info!(
            batch_code = %batch_code,
            count = codes.len(),
            duplicates,
            "generated batch short codes"
        );
        Ok(BatchResult {
            batch_code: batch_code.clone(),
            codes,
            duplicates,
        })
    }

    /// Delete the record behind `code`. Returns whether one was removed.
    pub async fn revoke_short_code(&self, input: &str) -> Result<bool, RedemptionError> {
        let Some(code) = normalize_code(input) else {
            return Ok(false);
        };
        let removed = self.store.delete(&format!("{KEY_PREFIX}{code}")).await?;
        if removed {
            tracing::info!(code = %code, "revoked short code");
        }
        Ok(removed)
    }
}
