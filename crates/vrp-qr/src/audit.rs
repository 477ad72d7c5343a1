//! # Audit Records
//!
//! Structured records of QR operations for an external audit pipeline.
//! Each record is also emitted as a `tracing` event on target `vrp::audit`.
//! Payloads are decoded for their identifiers; the payload itself is never
//! recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vrp_claims::VoucherGrant;
use vrp_core::{BatchCode, TokenType, UserId, VoucherId};

use crate::service::{QrService, QrValidation};

/// Operation being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Generate,
    Validate,
    Refresh,
    Redeem,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Validate => "validate",
            Self::Refresh => "refresh",
            Self::Redeem => "redeem",
        }
    }
}

/// Whether the audited operation succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl From<&QrValidation> for AuditOutcome {
    fn from(result: &QrValidation) -> Self {
        Self {
            success: result.valid,
            error: result.error.clone(),
        }
    }
}

/// Who performed the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_id: Option<VoucherId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<BatchCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub context: AuditContext,
}

impl QrService {
    /// Build an audit record for `action` and emit it on `vrp::audit`.
    pub fn create_audit_entry(
        &self,
        action: AuditAction,
        payload: Option<&str>,
        outcome: &AuditOutcome,
        context: &AuditContext,
    ) -> AuditEntry {
        let claims = payload
            .and_then(|p| self.codec.decode_token::<VoucherGrant>(p))
            .map(|decoded| decoded.claims);
        let entry = AuditEntry {
            timestamp: self.codec.clock().now(),
            action,
            success: outcome.success,
            voucher_id: claims.as_ref().map(|c| c.custom.vid.clone()),
            user_id: claims.as_ref().and_then(|c| c.custom.uid.clone()),
            batch_code: claims.as_ref().and_then(|c| c.custom.btc.clone()),
            token_type: claims.as_ref().map(|c| c.custom.typ),
            jti: claims.map(|c| c.registered.jti),
            error: outcome.error.clone(),
            context: context.clone(),
        };

        tracing::info!(
            target: "vrp::audit",
            action = action.as_str(),
            success = entry.success,
            voucher_id = entry.voucher_id.as_ref().map(VoucherId::as_str),
            token_type = entry.token_type.map(|t| t.as_str()),
            jti = entry.jti.as_deref(),
            error = entry.error.as_deref(),
            actor_id = entry.context.actor_id.as_deref(),
            "qr audit"
        );
        entry
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vrp_claims::UserClaimsOptions;
    use vrp_core::{ManualClock, RedemptionConfig};
    use vrp_crypto::{generate_key_pair, Curve};

    use super::*;
    use crate::service::ValidateOptions;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn entry_carries_payload_identifiers() {
        let service =
            QrService::new(RedemptionConfig::default(), Arc::new(ManualClock::at(NOW))).unwrap();
        let keys = generate_key_pair(Curve::P256).unwrap();
        let qr = service
            .generate_user_voucher_qr(
                &"v-1".into(),
                &"u-1".into(),
                keys.private_key(),
                &UserClaimsOptions::default(),
            )
            .unwrap();
        let result = service
            .validate_qr(&qr.qr_payload, keys.public_key(), &ValidateOptions::default())
            .unwrap();

        let context = AuditContext {
            actor_id: Some("cashier-4".into()),
            ip_address: Some("10.0.0.8".into()),
            user_agent: None,
        };
        let entry = service.create_audit_entry(
            AuditAction::Validate,
            Some(&qr.qr_payload),
            &AuditOutcome::from(&result),
            &context,
        );
        assert!(entry.success);
        assert_eq!(entry.timestamp.timestamp(), NOW);
        assert_eq!(entry.voucher_id.as_ref().map(VoucherId::as_str), Some("v-1"));
        assert_eq!(entry.user_id.as_ref().map(UserId::as_str), Some("u-1"));
        assert_eq!(entry.token_type, Some(TokenType::User));
        assert_eq!(entry.jti.as_deref(), Some(qr.claims.registered.jti.as_str()));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "validate");
        assert_eq!(json["actor_id"], "cashier-4");
        assert!(json.get("user_agent").is_none());
        assert!(!json.to_string().contains(&qr.qr_payload));
    }

    #[test]
    fn entry_without_payload() {
        let service =
            QrService::new(RedemptionConfig::default(), Arc::new(ManualClock::at(NOW))).unwrap();
        let entry = service.create_audit_entry(
            AuditAction::Redeem,
            None,
            &AuditOutcome::failure("Token expired"),
            &AuditContext::default(),
        );
        assert!(!entry.success);
        assert!(entry.voucher_id.is_none());
        assert_eq!(entry.error.as_deref(), Some("Token expired"));
    }
}
