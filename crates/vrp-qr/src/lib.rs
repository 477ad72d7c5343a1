//! # vrp-qr — QR Redemption Payloads
//!
//! Issues, validates, refreshes and introspects the signed payloads encoded
//! into voucher QR codes, and produces audit records of those operations.
//!
//! ## Trust Boundary
//!
//! Only [`QrService::validate_qr`] is authoritative. Expiration checks,
//! introspection, refresh and audit decode payloads without verifying them.

pub mod audit;
pub mod inspect;
pub mod metadata;
pub mod service;

pub use audit::{AuditAction, AuditContext, AuditEntry, AuditOutcome};
pub use inspect::{ExpirationStatus, QrIntrospection};
pub use metadata::{qr_version_for, Complexity, QrMetadata};
pub use service::{GeneratedQr, QrService, QrValidation, RefreshOptions, ValidateOptions};
pub use vrp_claims::{PrintClaimsOptions, UserClaimsOptions};
