//! # Code Format and Derivation
//!
//! A short code is eight symbols from a 32-symbol alphabet that drops the
//! look-alikes `I`, `O`, `0` and `1`, rendered as `XXXX-XXXX`. A two-symbol
//! checksum travels alongside it.
//!
//! ```text
//! seed   = HMAC-SHA256(secret, "vid:uid:typ:iat[:attempt]")
//! code   = seed[0..8]  mapped byte mod 32
//! check  = seed[8..10] mapped byte mod 32
//! anchor = HMAC-SHA256(secret, "code:check"), first 16 hex chars
//! ```
//!
//! Derivation is deterministic: identical inputs always give the same code.

use vrp_claims::RedemptionClaims;
use vrp_core::RedemptionError;
use vrp_crypto::{hmac_sha256, hmac_sha256_hex};

/// Code alphabet, without `I`, `O`, `0`, `1`.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Symbols per code, excluding the dash.
pub const CODE_SYMBOLS: usize = 8;

/// Symbols per checksum.
pub const CHECKSUM_SYMBOLS: usize = 2;

/// Hex characters kept from the integrity HMAC.
pub const ANCHOR_HEX_LEN: usize = 16;

/// A derived code and its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedCode {
    /// `XXXX-XXXX`.
    pub formatted: String,
    pub checksum: String,
}

/// Derive the code for `claims` on retry `attempt`. Attempt 0 adds no
/// suffix to the seed input.
pub fn derive_code(
    secret: &[u8],
    claims: &RedemptionClaims,
    attempt: u32,
) -> Result<DerivedCode, RedemptionError> {
    let grant = &claims.custom;
    let mut input = format!(
        "{}:{}:{}:{}",
        grant.vid,
        grant.uid.as_ref().map(|u| u.as_str()).unwrap_or_default(),
        grant.typ,
        claims.registered.iat
    );
    if attempt > 0 {
        input.push_str(&format!(":{attempt}"));
    }
    let seed = hmac_sha256(secret, input.as_bytes())?;

    let symbols = to_symbols(&seed[..CODE_SYMBOLS]);
    let (head, tail) = symbols.split_at(CODE_SYMBOLS / 2);
    Ok(DerivedCode {
        formatted: format!("{head}-{tail}"),
        checksum: to_symbols(&seed[CODE_SYMBOLS..CODE_SYMBOLS + CHECKSUM_SYMBOLS]),
    })
}

/// Integrity anchor stored next to the record.
pub fn integrity_anchor(
    secret: &[u8],
    formatted: &str,
    checksum: &str,
) -> Result<String, RedemptionError> {
    hmac_sha256_hex(secret, format!("{formatted}:{checksum}").as_bytes(), ANCHOR_HEX_LEN)
}

fn to_symbols(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| char::from(ALPHABET[usize::from(*b) % ALPHABET.len()]))
        .collect()
}

fn is_symbol(c: char) -> bool {
    c.is_ascii() && ALPHABET.contains(&(c as u8))
}

/// Canonicalize user input: trim, upper-case, and insert the dash into
/// eight bare symbols. `None` when the result is not `XXXX-XXXX` over the
/// alphabet.
pub fn normalize_code(input: &str) -> Option<String> {
    let upper = input.trim().to_ascii_uppercase();
    if !upper.is_ascii() {
        return None;
    }
    let candidate = if upper.len() == CODE_SYMBOLS && !upper.contains('-') {
        format!("{}-{}", &upper[..4], &upper[4..])
    } else {
        upper
    };
    is_valid_format(&candidate).then_some(candidate)
}

/// True for a canonical `XXXX-XXXX` code.
pub fn is_valid_format(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == CODE_SYMBOLS + 1
        && bytes[4] == b'-'
        && code
            .chars()
            .enumerate()
            .all(|(i, c)| i == 4 || is_symbol(c))
}

/// Canonicalize a checksum: trim and upper-case. `None` when malformed.
pub fn normalize_checksum(input: &str) -> Option<String> {
    let upper = input.trim().to_ascii_uppercase();
    (upper.len() == CHECKSUM_SYMBOLS && upper.chars().all(is_symbol)).then_some(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vrp_claims::VoucherGrant;
    use vrp_core::TokenType;
    use vrp_token::Claims;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn claims(vid: &str, iat: i64) -> RedemptionClaims {
        let mut claims = Claims::new(VoucherGrant {
            vid: vid.into(),
            uid: Some("u-1".into()),
            typ: TokenType::User,
            btc: None,
            lim: None,
        });
        claims.registered.iat = iat;
        claims
    }

    #[test]
    fn alphabet_excludes_lookalikes() {
        for c in [b'I', b'O', b'0', b'1'] {
            assert!(!ALPHABET.contains(&c));
        }
        let mut sorted = ALPHABET.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 32);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_code(SECRET, &claims("v-1", 100), 0).unwrap();
        let b = derive_code(SECRET, &claims("v-1", 100), 0).unwrap();
        assert_eq!(a, b);
        assert!(is_valid_format(&a.formatted));
        assert!(normalize_checksum(&a.checksum).is_some());
    }

    #[test]
    fn derivation_varies_with_inputs() {
        let base = derive_code(SECRET, &claims("v-1", 100), 0).unwrap();
        assert_ne!(base, derive_code(SECRET, &claims("v-1", 101), 0).unwrap());
        assert_ne!(base, derive_code(SECRET, &claims("v-1", 100), 1).unwrap());
        assert_ne!(base, derive_code(SECRET, &claims("v-2", 100), 0).unwrap());
        let other_secret = b"fedcba9876543210fedcba9876543210";
        assert_ne!(base, derive_code(other_secret, &claims("v-1", 100), 0).unwrap());
    }

    #[test]
    fn anchor_is_16_hex() {
        let anchor = integrity_anchor(SECRET, "ABCD-EFGH", "JK").unwrap();
        assert_eq!(anchor.len(), 16);
        assert!(anchor.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(anchor, integrity_anchor(SECRET, "ABCD-EFGH", "JL").unwrap());
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_code(" abcd-efgh ").as_deref(), Some("ABCD-EFGH"));
        assert_eq!(normalize_code("abcdefgh").as_deref(), Some("ABCD-EFGH"));
        assert_eq!(normalize_code("ABCD-EFG1"), None);
        assert_eq!(normalize_code("ABCDEFGHJ"), None);
        assert_eq!(normalize_code("ABC-DEFGH"), None);
        assert_eq!(normalize_code("ÄBCDEFG"), None);
        assert_eq!(normalize_checksum(" jk").as_deref(), Some("JK"));
        assert_eq!(normalize_checksum("J0"), None);
    }

    proptest! {
        #[test]
        fn derived_codes_are_always_well_formed(
            vid in "[a-z0-9-]{1,24}",
            iat in 0i64..4_000_000_000,
            attempt in 0u32..10,
        ) {
            let code = derive_code(SECRET, &claims(&vid, iat), attempt).unwrap();
            prop_assert!(is_valid_format(&code.formatted));
            let bare = code.formatted.replace('-', "");
            prop_assert_eq!(normalize_code(&bare), Some(code.formatted.clone()));
            prop_assert!(normalize_checksum(&code.checksum).is_some());
        }
    }
}
