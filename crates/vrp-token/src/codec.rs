//! # Token Codec
//!
//! Generation stamps the registered claims (`iss`, `aud`, `iat`, `jti` and,
//! when a lifetime is given, `exp`), serializes header and claims, and signs
//! the ASCII signing input `header_b64 "." claims_b64`.
//!
//! Verification runs in a fixed order, stopping at the first failure:
//!
//! 1. Structure: three non-empty base64url segments, JSON header and claims.
//! 2. Algorithm: header `alg` must equal the configured algorithm verbatim.
//!    There is no fallback; `none` and HMAC algorithms are rejected here.
//! 3. Signature: fixed-width `r ‖ s` against the signing input.
//! 4. Claims: `exp`, `nbf`, `iat` skew, `iss`, `aud`.
//!
//! Steps 1-3 fail with an error. Step 4 produces a [`Verdict`], with expiry
//! reported as [`Verdict::Expired`] so callers can tell it apart.
//!
//! ## Security Invariant
//!
//! Claims are never trusted before the signature over their exact encoded
//! bytes has verified. [`TokenCodec::decode_token`] skips verification and
//! must only feed display paths.

use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use vrp_core::{RedemptionConfig, RedemptionError, SharedClock, SystemClock, Verdict};
use vrp_crypto::{
    base64url_decode, base64url_encode, sha256_hex, Curve, EcPrivateKey, EcPublicKey,
    SignatureComponents,
};

use crate::claims::Claims;
use crate::header::TokenHeader;

/// Upper bound on the length of a token accepted for parsing.
pub const MAX_TOKEN_LEN: usize = 8 * 1024;

/// Per-issuance options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Lifetime in seconds. Sets `exp = iat + ttl`; without it the `exp`
    /// already present in the claims is kept.
    pub ttl_secs: Option<i64>,
    /// Caller-supplied nonce. A fresh one is generated when absent.
    pub jti: Option<String>,
}

impl SignOptions {
    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self {
            ttl_secs: Some(ttl_secs),
            jti: None,
        }
    }

    pub fn jti(mut self, jti: impl Into<String>) -> Self {
        self.jti = Some(jti.into());
        self
    }
}

/// A generated token together with the claims exactly as signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken<T> {
    pub token: String,
    pub claims: Claims<T>,
}

/// Header and claims read without verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken<T> {
    pub header: TokenHeader,
    pub claims: Claims<T>,
}

/// Issues and verifies tokens for one issuer configuration.
#[derive(Clone)]
pub struct TokenCodec {
    config: RedemptionConfig,
    clock: SharedClock,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec. The configuration is validated up front.
    pub fn new(config: RedemptionConfig, clock: SharedClock) -> Result<Self, RedemptionError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    /// A codec reading wall-clock time.
    pub fn with_system_clock(config: RedemptionConfig) -> Result<Self, RedemptionError> {
        Self::new(config, std::sync::Arc::new(SystemClock))
    }

    pub fn config(&self) -> &RedemptionConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Curve implied by the configured algorithm.
    pub fn curve(&self) -> Curve {
        Curve::from_algorithm(self.config.algorithm)
    }

    /// Sign `claims` and return the compact token.
    pub fn generate_token<T: Serialize>(
        &self,
        claims: Claims<T>,
        private_key_pem: &str,
        options: &SignOptions,
    ) -> Result<String, RedemptionError> {
        self.issue_token(claims, private_key_pem, options)
            .map(|signed| signed.token)
    }

    /// Sign `claims`, returning the token and the claims as stamped.
    ///
    /// `iss`, `aud`, `iat` and `jti` are always overwritten; `exp` is
    /// overwritten when [`SignOptions::ttl_secs`] is set.
    pub fn issue_token<T: Serialize>(
        &self,
        mut claims: Claims<T>,
        private_key_pem: &str,
        options: &SignOptions,
    ) -> Result<SignedToken<T>, RedemptionError> {
        let key = EcPrivateKey::from_pem(private_key_pem, self.curve())?;

        let now = self.clock.now_secs();
        let registered = &mut claims.registered;
        registered.iss = self.config.issuer.clone();
        registered.aud = self.config.primary_audience().to_string();
        registered.iat = now;
        registered.jti = match &options.jti {
            Some(jti) => jti.clone(),
            None => generate_jti(now),
        };
        if let Some(ttl) = options.ttl_secs {
            registered.exp = Some(now.saturating_add(ttl));
        }

        let header = TokenHeader::for_algorithm(self.config.algorithm);
        let signing_input = format!(
            "{}.{}",
            base64url_encode(&serde_json::to_vec(&header)?),
            base64url_encode(&serde_json::to_vec(&claims)?)
        );
        let signature = key.sign(signing_input.as_bytes()).to_p1363()?;
        let token = format!("{signing_input}.{}", base64url_encode(&signature));

        tracing::debug!(
            alg = %self.config.algorithm,
            jti = %claims.registered.jti,
            exp = ?claims.registered.exp,
            "issued token"
        );
        Ok(SignedToken { token, claims })
    }

    /// Authoritatively verify `token` against `public_key_pem`.
    ///
    /// Structural, algorithm, key and signature failures are errors; claim
    /// failures are a [`Verdict`].
    pub fn verify_token<T: DeserializeOwned>(
        &self,
        token: &str,
        public_key_pem: &str,
    ) -> Result<Verdict<Claims<T>>, RedemptionError> {
        let (header_b64, claims_b64, signature_b64) = split_segments(token)?;

        let header: TokenHeader = decode_segment(header_b64, "header")?;
        let expected = self.config.algorithm.as_str();
        if header.alg != expected {
            return Err(RedemptionError::AlgorithmMismatch {
                expected: expected.to_string(),
                found: header.alg,
            });
        }

        let curve = self.curve();
        let signature_bytes = base64url_decode(signature_b64).map_err(|_| {
            RedemptionError::InvalidSignature("signature segment is not base64url".into())
        })?;
        let signature = SignatureComponents::from_p1363(&signature_bytes, curve)?;
        let key = EcPublicKey::from_pem(public_key_pem, curve)?;
        let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
        if !key.verify(signing_input.as_bytes(), &signature) {
            return Err(RedemptionError::InvalidSignature(
                "signature does not match token contents".into(),
            ));
        }

        let claims: Claims<T> = decode_segment(claims_b64, "claims")?;
        Ok(self.check_registered_claims(claims))
    }

    /// Read header and claims without verifying anything. `None` when the
    /// token does not parse.
    pub fn decode_token<T: DeserializeOwned>(&self, token: &str) -> Option<DecodedToken<T>> {
        let (header_b64, claims_b64, _) = split_segments(token).ok()?;
        let header = decode_segment(header_b64, "header").ok()?;
        let claims = decode_segment(claims_b64, "claims").ok()?;
        Some(DecodedToken { header, claims })
    }

    fn check_registered_claims<T>(&self, claims: Claims<T>) -> Verdict<Claims<T>> {
        let now = self.clock.now_secs();
        let registered = &claims.registered;

        if let Some(exp) = registered.exp {
            if now >= exp {
                return Verdict::Expired { expired_at: exp };
            }
        }
        if registered.nbf.is_some_and(|nbf| now < nbf) {
            return Verdict::invalid("Token not yet valid");
        }
        if registered.iat > now.saturating_add(self.config.clock_skew_secs) {
            return Verdict::invalid("Token issued in the future");
        }
        if registered.iss != self.config.issuer {
            return Verdict::invalid("Invalid issuer");
        }
        if !self.config.audience.iter().any(|aud| *aud == registered.aud) {
            return Verdict::invalid("Invalid audience");
        }
        Verdict::Valid(claims)
    }
}

/// True when `token` has the outer shape of a compact token: bounded length
/// and three non-empty base64url segments. Says nothing about validity.
pub fn is_well_formed(token: &str) -> bool {
    split_segments(token).is_ok()
}

fn split_segments(token: &str) -> Result<(&str, &str, &str), RedemptionError> {
    if token.len() > MAX_TOKEN_LEN {
        return Err(RedemptionError::invalid_token(format!(
            "token exceeds {MAX_TOKEN_LEN} bytes"
        )));
    }
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(c), Some(s), None)
            if [h, c, s].iter().all(|seg| is_base64url_segment(seg)) =>
        {
            Ok((h, c, s))
        }
        _ => Err(RedemptionError::invalid_token(
            "expected 3 non-empty base64url segments",
        )),
    }
}

fn is_base64url_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, RedemptionError> {
    let bytes = base64url_decode(segment)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RedemptionError::invalid_token(format!("malformed {what}: {e}")))
}

/// 16 hex characters of SHA-256 over 16 random bytes and the issuance time.
fn generate_jti(now: i64) -> String {
    let mut input = [0u8; 24];
    rand::rngs::OsRng.fill_bytes(&mut input[..16]);
    input[16..].copy_from_slice(&now.to_be_bytes());
    let mut jti = sha256_hex(&input);
    jti.truncate(16);
    jti
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;
    use serde::Deserialize;
    use vrp_core::{ManualClock, TokenAlgorithm};
    use vrp_crypto::{generate_key_pair, KeyPair};

    const NOW: i64 = 1_700_000_000;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Grant {
        vid: String,
    }

    fn grant() -> Claims<Grant> {
        Claims::new(Grant { vid: "v-1".into() })
    }

    fn codec_at(secs: i64, config: RedemptionConfig) -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(secs));
        let codec = TokenCodec::new(config, clock.clone()).unwrap();
        (codec, clock)
    }

    fn setup() -> (TokenCodec, Arc<ManualClock>, KeyPair) {
        let (codec, clock) = codec_at(NOW, RedemptionConfig::default());
        (codec, clock, generate_key_pair(Curve::P256).unwrap())
    }

    fn verify(codec: &TokenCodec, token: &str, keys: &KeyPair) -> Verdict<Claims<Grant>> {
        codec.verify_token(token, keys.public_key()).unwrap()
    }

    #[test]
    fn generate_then_verify() {
        let (codec, _, keys) = setup();
        let signed = codec
            .issue_token(grant(), keys.private_key(), &SignOptions::with_ttl(300))
            .unwrap();
        assert_eq!(signed.token.split('.').count(), 3);

        let claims = verify(&codec, &signed.token, &keys).valid().unwrap();
        assert_eq!(claims, signed.claims);
        assert_eq!(claims.registered.iss, "voucher-redemption");
        assert_eq!(claims.registered.aud, "voucher-redemption-clients");
        assert_eq!(claims.registered.iat, NOW);
        assert_eq!(claims.registered.exp, Some(NOW + 300));
        assert_eq!(claims.custom.vid, "v-1");
    }

    #[test]
    fn header_names_configured_algorithm() {
        let (codec, _, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        let decoded = codec.decode_token::<Grant>(&token).unwrap();
        assert_eq!(decoded.header.alg, "ES256");
        assert_eq!(decoded.header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn es384_round_trip() {
        let config = RedemptionConfig {
            algorithm: TokenAlgorithm::ES384,
            ..RedemptionConfig::default()
        };
        let (codec, _) = codec_at(NOW, config);
        let keys = generate_key_pair(Curve::P384).unwrap();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::with_ttl(60))
            .unwrap();
        assert!(verify(&codec, &token, &keys).is_valid());
        let signature = base64url_decode(token.rsplit('.').next().unwrap()).unwrap();
        assert_eq!(signature.len(), 96);
    }

    #[test]
    fn jti_is_16_hex_and_fresh() {
        let (codec, _, keys) = setup();
        let a = codec
            .issue_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        let b = codec
            .issue_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(a.claims.registered.jti.len(), 16);
        assert!(a.claims.registered.jti.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.claims.registered.jti, b.claims.registered.jti);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn caller_jti_is_kept() {
        let (codec, _, keys) = setup();
        let signed = codec
            .issue_token(grant(), keys.private_key(), &SignOptions::with_ttl(10).jti("nonce-1"))
            .unwrap();
        assert_eq!(signed.claims.registered.jti, "nonce-1");
    }

    #[test]
    fn caller_supplied_registered_claims_are_overwritten() {
        let (codec, _, keys) = setup();
        let mut claims = grant();
        claims.registered.iss = "attacker".into();
        claims.registered.aud = "elsewhere".into();
        claims.registered.iat = 1;
        let signed = codec
            .issue_token(claims, keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(signed.claims.registered.iss, "voucher-redemption");
        assert_eq!(signed.claims.registered.aud, "voucher-redemption-clients");
        assert_eq!(signed.claims.registered.iat, NOW);
    }

    #[test]
    fn single_audience_with_multiple_configured() {
        let config = RedemptionConfig {
            audience: vec!["pos".into(), "mobile".into()],
            ..RedemptionConfig::default()
        };
        let (codec, _) = codec_at(NOW, config);
        let keys = generate_key_pair(Curve::P256).unwrap();
        let signed = codec
            .issue_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(signed.claims.registered.aud, "pos");
        let decoded: serde_json::Value = serde_json::from_slice(
            &base64url_decode(signed.token.split('.').nth(1).unwrap()).unwrap(),
        )
        .unwrap();
        assert!(decoded["aud"].is_string());
    }

    #[test]
    fn expiry_boundary() {
        let (codec, _, keys) = setup();

        let mut claims = grant();
        claims.registered.exp = Some(NOW - 1);
        let token = codec
            .generate_token(claims, keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(
            verify(&codec, &token, &keys),
            Verdict::Expired { expired_at: NOW - 1 }
        );

        let mut claims = grant();
        claims.registered.exp = Some(NOW + 1);
        let token = codec
            .generate_token(claims, keys.private_key(), &SignOptions::default())
            .unwrap();
        assert!(verify(&codec, &token, &keys).is_valid());
    }

    #[test]
    fn expires_as_clock_advances() {
        let (codec, clock, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::with_ttl(300))
            .unwrap();
        clock.advance(299);
        assert!(verify(&codec, &token, &keys).is_valid());
        clock.advance(2);
        assert!(verify(&codec, &token, &keys).is_expired());
    }

    #[test]
    fn not_before_in_future_is_invalid() {
        let (codec, _, keys) = setup();
        let mut claims = grant();
        claims.registered.nbf = Some(NOW + 30);
        let token = codec
            .generate_token(claims, keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(verify(&codec, &token, &keys).reason(), Some("Token not yet valid"));
    }

    #[test]
    fn issued_at_skew() {
        let keys = generate_key_pair(Curve::P256).unwrap();
        let (verifier, _) = codec_at(NOW, RedemptionConfig::default());

        let (ahead_ok, _) = codec_at(NOW + 60, RedemptionConfig::default());
        let token = ahead_ok
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert!(verify(&verifier, &token, &keys).is_valid());

        let (ahead_bad, _) = codec_at(NOW + 61, RedemptionConfig::default());
        let token = ahead_bad
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert_eq!(
            verify(&verifier, &token, &keys).reason(),
            Some("Token issued in the future")
        );
    }

    #[test]
    fn issuer_and_audience_must_match() {
        let keys = generate_key_pair(Curve::P256).unwrap();
        let (issuer, _) = codec_at(NOW, RedemptionConfig::default());
        let token = issuer
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();

        let (other_iss, _) = codec_at(
            NOW,
            RedemptionConfig {
                issuer: "someone-else".into(),
                ..RedemptionConfig::default()
            },
        );
        assert_eq!(verify(&other_iss, &token, &keys).reason(), Some("Invalid issuer"));

        let (other_aud, _) = codec_at(
            NOW,
            RedemptionConfig {
                audience: vec!["kiosk".into()],
                ..RedemptionConfig::default()
            },
        );
        assert_eq!(verify(&other_aud, &token, &keys).reason(), Some("Invalid audience"));

        let (secondary_aud, _) = codec_at(
            NOW,
            RedemptionConfig {
                audience: vec!["kiosk".into(), "voucher-redemption-clients".into()],
                ..RedemptionConfig::default()
            },
        );
        assert!(verify(&secondary_aud, &token, &keys).is_valid());
    }

    #[test]
    fn algorithm_mismatch_is_rejected_before_signature() {
        let keys = generate_key_pair(Curve::P256).unwrap();
        let es384 = RedemptionConfig {
            algorithm: TokenAlgorithm::ES384,
            ..RedemptionConfig::default()
        };
        let (p384_codec, _) = codec_at(NOW, es384);
        let p384_keys = generate_key_pair(Curve::P384).unwrap();
        let token = p384_codec
            .generate_token(grant(), p384_keys.private_key(), &SignOptions::default())
            .unwrap();

        let (p256_codec, _) = codec_at(NOW, RedemptionConfig::default());
        match p256_codec.verify_token::<Grant>(&token, keys.public_key()) {
            Err(RedemptionError::AlgorithmMismatch { expected, found }) => {
                assert_eq!(expected, "ES256");
                assert_eq!(found, "ES384");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn alg_none_is_rejected() {
        let (codec, _, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_header = base64url_encode(br#"{"alg":"none","typ":"JWT"}"#);
        parts[0] = &forged_header;
        let forged = parts.join(".");
        assert!(matches!(
            codec.verify_token::<Grant>(&forged, keys.public_key()),
            Err(RedemptionError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn every_signature_bit_flip_is_rejected() {
        let (codec, _, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::with_ttl(300))
            .unwrap();
        let (signing_input, sig_b64) = token.rsplit_once('.').unwrap();
        let signature = base64url_decode(sig_b64).unwrap();
        for bit in 0..signature.len() * 8 {
            let mut tampered = signature.clone();
            tampered[bit / 8] ^= 1 << (bit % 8);
            let forged = format!("{signing_input}.{}", base64url_encode(&tampered));
            assert!(
                codec.verify_token::<Grant>(&forged, keys.public_key()).is_err(),
                "bit {bit} flip accepted"
            );
        }
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let (codec, _, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::with_ttl(300))
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let claims: serde_json::Value =
            serde_json::from_slice(&base64url_decode(parts[1]).unwrap()).unwrap();
        let mut altered = claims.clone();
        altered["vid"] = "v-2".into();
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            base64url_encode(&serde_json::to_vec(&altered).unwrap()),
            parts[2]
        );
        assert!(matches!(
            codec.verify_token::<Grant>(&forged, keys.public_key()),
            Err(RedemptionError::InvalidSignature(_))
        ));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let (codec, _, keys) = setup();
        let other = generate_key_pair(Curve::P256).unwrap();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert!(matches!(
            codec.verify_token::<Grant>(&token, other.public_key()),
            Err(RedemptionError::InvalidSignature(_))
        ));
    }

    #[test]
    fn structural_failures() {
        let (codec, _, keys) = setup();
        for token in ["", "a.b", "a.b.c.d", "a..c", "a.b.c!", "not a token"] {
            assert!(
                matches!(
                    codec.verify_token::<Grant>(token, keys.public_key()),
                    Err(RedemptionError::InvalidToken { .. })
                ),
                "{token:?}"
            );
            assert!(codec.decode_token::<Grant>(token).is_none());
        }
        let oversized = format!("{}.b.c", "a".repeat(MAX_TOKEN_LEN));
        assert!(!is_well_formed(&oversized));
    }

    #[test]
    fn malformed_public_key_is_an_error() {
        let (codec, _, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::default())
            .unwrap();
        assert!(matches!(
            codec.verify_token::<Grant>(&token, "not a pem"),
            Err(RedemptionError::InvalidKey(_))
        ));
    }

    #[test]
    fn malformed_private_key_is_an_error() {
        let (codec, _, _) = setup();
        assert!(matches!(
            codec.generate_token(grant(), "not a pem", &SignOptions::default()),
            Err(RedemptionError::InvalidKey(_))
        ));
    }

    #[test]
    fn decode_reads_expired_token() {
        let (codec, clock, keys) = setup();
        let token = codec
            .generate_token(grant(), keys.private_key(), &SignOptions::with_ttl(10))
            .unwrap();
        clock.advance(1_000);
        assert!(verify(&codec, &token, &keys).is_expired());
        let decoded = codec.decode_token::<Grant>(&token).unwrap();
        assert_eq!(decoded.claims.custom.vid, "v-1");
        assert_eq!(decoded.claims.registered.exp, Some(NOW + 10));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn issued_tokens_verify_until_exp(vid in "\\PC{1,40}", ttl in 1i64..1_000_000) {
            let (codec, clock, keys) = setup();
            let claims = Claims::new(Grant { vid: vid.clone() });
            let signed = codec
                .issue_token(claims, keys.private_key(), &SignOptions::with_ttl(ttl))
                .unwrap();
            prop_assert!(is_well_formed(&signed.token));

            match verify(&codec, &signed.token, &keys) {
                Verdict::Valid(claims) => {
                    prop_assert_eq!(claims.custom.vid, vid);
                    prop_assert_eq!(claims.registered.exp, Some(NOW + ttl));
                }
                other => prop_assert!(false, "unexpected verdict: {:?}", other),
            }

            clock.set(NOW + ttl);
            let expired = matches!(
                verify(&codec, &signed.token, &keys),
                Verdict::Expired { expired_at } if expired_at == NOW + ttl
            );
            prop_assert!(expired);
        }
    }
}
