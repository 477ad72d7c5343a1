//! # vrp-token — Signed Token Codec
//!
//! Builds, parses and verifies three-segment signed tokens:
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(r ‖ s)
//! ```
//!
//! Header and claims are UTF-8 JSON objects; the signature is the fixed-width
//! IEEE P1363 concatenation of the ECDSA components, never ASN.1. All
//! segments are base64url without padding.
//!
//! Decoding ([`TokenCodec::decode_token`]) and verification
//! ([`TokenCodec::verify_token`]) are separate operations: reading an expired
//! token for display never goes through the authoritative path.

pub mod claims;
pub mod codec;
pub mod header;

pub use claims::{Claims, RegisteredClaims};
pub use codec::{DecodedToken, SignOptions, SignedToken, TokenCodec, MAX_TOKEN_LEN};
pub use header::TokenHeader;
