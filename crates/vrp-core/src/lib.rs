//! # vrp-core — Foundational Types for Voucher Redemption Proofs
//!
//! Every other crate in the workspace depends on `vrp-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for opaque identifiers.** `VoucherId`, `UserId` and
//!    `BatchCode` are distinct types, so a batch code can never be passed
//!    where a user id is expected.
//!
//! 2. **One error taxonomy.** [`RedemptionError`] is shared by the signing
//!    primitive, the token codec, the QR layer and the short-code engine.
//!
//! 3. **Discriminated verdicts.** [`Verdict`] separates `Valid`, `Expired`
//!    and `Invalid` so callers switch on a stable tag instead of matching
//!    error text.
//!
//! 4. **Injected time.** All "now" reads go through the [`Clock`] trait.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vrp-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod identity;
pub mod temporal;
pub mod verdict;

// Re-export primary types for ergonomic imports.
pub use config::{RedemptionConfig, ShortCodeConfig, TokenAlgorithm};
pub use error::{ErrorContext, RedemptionError};
pub use identity::{BatchCode, TokenType, UserId, VoucherId};
pub use temporal::{Clock, ManualClock, SharedClock, SystemClock};
pub use verdict::Verdict;
