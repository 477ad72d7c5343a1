//! # Registered Claims
//!
//! The standard claim set shared by every token, flattened next to the
//! application-specific claims so the wire form is a single JSON object.

use serde::{Deserialize, Serialize};

/// Standard claims stamped by the codec on every issuance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredClaims {
    /// Issuer.
    #[serde(default)]
    pub iss: String,
    /// Audience: always exactly one value.
    #[serde(default)]
    pub aud: String,
    /// Issued-at, Unix seconds.
    #[serde(default)]
    pub iat: i64,
    /// Expiry, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Not-before, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Per-issuance nonce.
    #[serde(default)]
    pub jti: String,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

/// A full claim set: registered claims plus application claims `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    #[serde(flatten)]
    pub custom: T,
}

impl<T> Claims<T> {
    /// Wrap application claims with empty registered claims; the codec fills
    /// them in on generation.
    pub fn new(custom: T) -> Self {
        Self {
            registered: RegisteredClaims::default(),
            custom,
        }
    }

    /// Seconds until `exp` at `now`, clamped at zero. `None` without `exp`.
    pub fn remaining_ttl(&self, now: i64) -> Option<i64> {
        self.registered.exp.map(|exp| (exp - now).max(0))
    }

    /// True when `exp` is present and not after `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.registered.exp.is_some_and(|exp| now >= exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Grant {
        vid: String,
    }

    #[test]
    fn flattened_wire_shape() {
        let mut claims = Claims::new(Grant { vid: "v-1".into() });
        claims.registered.iss = "issuer".into();
        claims.registered.aud = "aud".into();
        claims.registered.iat = 100;
        claims.registered.jti = "abc".into();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            json!({"iss": "issuer", "aud": "aud", "iat": 100, "jti": "abc", "vid": "v-1"})
        );
        let back: Claims<Grant> = serde_json::from_value(value).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn remaining_ttl_clamps() {
        let mut claims = Claims::new(Grant { vid: "v".into() });
        assert_eq!(claims.remaining_ttl(10), None);
        claims.registered.exp = Some(100);
        assert_eq!(claims.remaining_ttl(40), Some(60));
        assert_eq!(claims.remaining_ttl(500), Some(0));
    }

    #[test]
    fn expiry_boundary() {
        let mut claims = Claims::new(Grant { vid: "v".into() });
        assert!(!claims.is_expired_at(i64::MAX));
        claims.registered.exp = Some(100);
        assert!(!claims.is_expired_at(99));
        assert!(claims.is_expired_at(100));
    }
}
