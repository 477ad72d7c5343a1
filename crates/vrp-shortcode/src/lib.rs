//! # vrp-shortcode — Short Codes
//!
//! Eight-symbol codes a holder can read out or type in when a QR code
//! cannot be scanned. A code maps to one immutable claims snapshot held
//! server-side in a [`RecordStore`], guarded by an HMAC integrity anchor.
//!
//! Codes are unique within a generation batch. Across batches a collision
//! is possible in principle; the later record replaces the earlier one.

pub mod code;
pub mod engine;
pub mod store;

pub use code::{
    derive_code, integrity_anchor, is_valid_format, normalize_code, DerivedCode, ALPHABET,
};
pub use engine::{
    BatchEntry, BatchOptions, BatchResult, ShortCode, ShortCodeEngine, ShortCodeRecord,
    ShortCodeValidateOptions, ShortCodeValidation, DEFAULT_MAX_ATTEMPTS, KEY_PREFIX,
};
pub use store::{MemoryStore, RecordStore};
