//! # Claims Validation
//!
//! Post-verification invariants of a redemption claim set. The codec has
//! already checked authenticity and the registered claims; this layer checks
//! that the voucher grant is internally consistent and re-checks expiry.

use vrp_core::{SharedClock, TokenType, Verdict};

use crate::grant::RedemptionClaims;

/// Validates claim sets against the current time.
#[derive(Clone)]
pub struct ClaimsValidator {
    clock: SharedClock,
}

impl ClaimsValidator {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Check the per-type required fields, `exp >= iat`, and expiry.
    pub fn validate_redemption_claims(&self, claims: &RedemptionClaims) -> Verdict<()> {
        let grant = &claims.custom;
        if grant.vid.is_blank() {
            return Verdict::invalid("Missing voucher ID");
        }
        match grant.typ {
            TokenType::User if grant.uid.as_ref().map_or(true, |u| u.is_blank()) => {
                return Verdict::invalid("User voucher missing user ID");
            }
            TokenType::Print if grant.btc.as_ref().map_or(true, |b| b.is_blank()) => {
                return Verdict::invalid("Print voucher missing batch code");
            }
            _ => {}
        }
        if let Some(exp) = claims.registered.exp {
            if exp < claims.registered.iat {
                return Verdict::invalid("Expiry precedes issue time");
            }
            if self.clock.now_secs() >= exp {
                return Verdict::Expired { expired_at: exp };
            }
        }
        Verdict::Valid(())
    }

    /// Seconds until expiry, clamped at zero. `None` without `exp`.
    pub fn remaining_ttl(&self, claims: &RedemptionClaims) -> Option<i64> {
        claims.remaining_ttl(self.clock.now_secs())
    }

    /// True when the claims are still live but expire within
    /// `threshold_secs`.
    pub fn is_near_expiration(&self, claims: &RedemptionClaims, threshold_secs: i64) -> bool {
        match self.remaining_ttl(claims) {
            Some(remaining) => remaining > 0 && remaining <= threshold_secs,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vrp_core::ManualClock;
    use vrp_token::Claims;

    use crate::grant::VoucherGrant;

    const NOW: i64 = 1_700_000_000;

    fn user_claims(exp: Option<i64>) -> RedemptionClaims {
        let mut claims = Claims::new(VoucherGrant {
            vid: "v-1".into(),
            uid: Some("u-1".into()),
            typ: TokenType::User,
            btc: None,
            lim: None,
        });
        claims.registered.iat = NOW;
        claims.registered.exp = exp;
        claims
    }

    fn validator() -> (ClaimsValidator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(NOW));
        (ClaimsValidator::new(clock.clone()), clock)
    }

    #[test]
    fn live_claims_are_valid() {
        let (validator, _) = validator();
        assert!(validator
            .validate_redemption_claims(&user_claims(Some(NOW + 300)))
            .is_valid());
        assert!(validator.validate_redemption_claims(&user_claims(None)).is_valid());
    }

    #[test]
    fn expiry_is_distinguishable() {
        let (validator, clock) = validator();
        let claims = user_claims(Some(NOW + 300));
        clock.advance(300);
        assert_eq!(
            validator.validate_redemption_claims(&claims),
            Verdict::Expired { expired_at: NOW + 300 }
        );
    }

    #[test]
    fn missing_fields_per_type() {
        let (validator, _) = validator();

        let mut claims = user_claims(None);
        claims.custom.uid = None;
        assert_eq!(
            validator.validate_redemption_claims(&claims).reason(),
            Some("User voucher missing user ID")
        );

        let mut claims = user_claims(None);
        claims.custom.typ = TokenType::Print;
        assert_eq!(
            validator.validate_redemption_claims(&claims).reason(),
            Some("Print voucher missing batch code")
        );

        let mut claims = user_claims(None);
        claims.custom.vid = "".into();
        assert_eq!(
            validator.validate_redemption_claims(&claims).reason(),
            Some("Missing voucher ID")
        );
    }

    #[test]
    fn expiry_before_issue_is_invalid() {
        let (validator, _) = validator();
        assert_eq!(
            validator
                .validate_redemption_claims(&user_claims(Some(NOW - 1)))
                .reason(),
            Some("Expiry precedes issue time")
        );
    }

    #[test]
    fn remaining_ttl_and_near_expiry() {
        let (validator, clock) = validator();
        let claims = user_claims(Some(NOW + 300));
        assert_eq!(validator.remaining_ttl(&claims), Some(300));
        assert!(!validator.is_near_expiration(&claims, 60));

        clock.advance(250);
        assert_eq!(validator.remaining_ttl(&claims), Some(50));
        assert!(validator.is_near_expiration(&claims, 60));

        clock.advance(100);
        assert_eq!(validator.remaining_ttl(&claims), Some(0));
        assert!(!validator.is_near_expiration(&claims, 60));

        assert_eq!(validator.remaining_ttl(&user_claims(None)), None);
        assert!(!validator.is_near_expiration(&user_claims(None), 60));
    }
}
