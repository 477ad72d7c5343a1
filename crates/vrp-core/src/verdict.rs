//! # Verdicts — Discriminated Verification Outcomes
//!
//! A [`Verdict`] is what every verification path returns for conditions a
//! caller is expected to branch on. `Expired` is its own variant because
//! some callers (UX display of an expired voucher) opt in to tolerate it.

use crate::error::RedemptionError;

/// Outcome of a verification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    /// The subject passed every check.
    Valid(T),
    /// The subject is authentic but its `exp` lies in the past.
    Expired {
        /// Unix seconds of the `exp` claim.
        expired_at: i64,
    },
    /// The subject failed a check; the reason is safe to show to clients.
    Invalid(String),
}

impl<T> Verdict<T> {
    /// Shorthand for `Verdict::Invalid`.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Whether every check passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Whether the subject is authentic but past its `exp`.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// The valid value, if any.
    pub fn valid(self) -> Option<T> {
        match self {
            Self::Valid(v) => Some(v),
            _ => None,
        }
    }

    /// The rejection reason for `Invalid` verdicts.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Invalid(reason) => Some(reason),
            _ => None,
        }
    }

    /// Transform the valid value, keeping `Expired`/`Invalid` as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Verdict<U> {
        match self {
            Self::Valid(v) => Verdict::Valid(f(v)),
            Self::Expired { expired_at } => Verdict::Expired { expired_at },
            Self::Invalid(reason) => Verdict::Invalid(reason),
        }
    }

    /// Collapse into a `Result` for callers that want `?` propagation.
    pub fn into_result(self) -> Result<T, RedemptionError> {
        match self {
            Self::Valid(v) => Ok(v),
            Self::Expired { expired_at } => Err(RedemptionError::TokenExpired { expired_at }),
            Self::Invalid(reason) => Err(RedemptionError::invalid_token(reason)),
        }
    }
}
