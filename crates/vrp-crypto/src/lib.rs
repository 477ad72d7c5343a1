//! # vrp-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for redemption proofs:
//!
//! - **ECDSA** signing and verification over P-256 (`ES256`) and P-384
//!   (`ES384`), with fixed-width `r`/`s` components.
//! - **HMAC-SHA256** and **SHA-256** helpers for short-code derivation,
//!   the short-code integrity anchor, and token nonces.
//! - **Constant-time comparison** for every secret-bearing equality check.
//! - **Key/secret provisioning**: key-pair generation, rotation, and
//!   short-code secret generation. Not a runtime hot path.
//!
//! ## Crate Policy
//!
//! - Depends only on `vrp-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   curves, real SHA-256 and real HMAC.
//! - Private keys are never serialized or logged.

pub mod digest;
pub mod ecdsa;
pub mod encoding;
pub mod mac;
pub mod provision;

pub use digest::{sha256, sha256_hex};
pub use ecdsa::{sign, verify, Curve, EcPrivateKey, EcPublicKey, SignatureComponents};
pub use encoding::{base64url_decode, base64url_encode, bytes_to_hex, hex_to_bytes};
pub use mac::{constant_time_eq, hmac_sha256, hmac_sha256_hex};
pub use provision::{
    check_key_pair, generate_key_pair, generate_secret, rotate_key_pair, KeyPair, KeyRotation,
};
