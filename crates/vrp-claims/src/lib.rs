//! # vrp-claims — Redemption Claims
//!
//! The voucher-specific claim set ([`VoucherGrant`]) carried inside every
//! redemption token, how it is built for the two redemption channels, and the
//! invariants a verified token must still satisfy:
//!
//! | `typ`   | requires | default lifetime |
//! |---------|----------|------------------|
//! | `user`  | `uid`    | 300 s            |
//! | `print` | `btc`    | 30 days          |
//!
//! Validation here runs after signature verification and re-checks expiry
//! independently of the codec.

pub mod builder;
pub mod grant;
pub mod validate;

pub use builder::{ClaimsBuilder, PrintClaimsOptions, UserClaimsOptions};
pub use grant::{extract_voucher_info, RedemptionClaims, VoucherGrant, VoucherInfo};
pub use validate::ClaimsValidator;
