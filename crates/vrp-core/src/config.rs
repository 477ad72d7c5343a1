//! # Configuration
//!
//! Issuer identity, token lifetimes and short-code secret. Loaded from the
//! environment by deployments (`VRP_*` variables) or deserialized from a
//! config document; [`RedemptionConfig::validate`] runs in both paths.

use serde::{Deserialize, Serialize};

use crate::error::RedemptionError;

/// Default lifetime of a user-voucher token: an in-person redemption window.
pub const DEFAULT_USER_TTL_SECS: i64 = 300;

/// Default lifetime of a print-voucher token: 30 days.
pub const DEFAULT_PRINT_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Tolerated clock skew for `iat` values in the future.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 60;

/// Minimum length of the short-code secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Signature algorithm written into token headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenAlgorithm {
    /// ECDSA over P-256 with SHA-256.
    ES256,
    /// ECDSA over P-384 with SHA-384.
    ES384,
}

impl TokenAlgorithm {
    /// Header name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
        }
    }
}

impl std::fmt::Display for TokenAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenAlgorithm {
    type Err = RedemptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            other => Err(RedemptionError::Config(format!(
                "unsupported token algorithm {other:?}"
            ))),
        }
    }
}

/// Token issuance and verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedemptionConfig {
    /// `iss` written into and required from every token.
    pub issuer: String,
    /// Accepted audiences. Tokens carry exactly one: the first entry.
    pub audience: Vec<String>,
    /// Signature algorithm.
    pub algorithm: TokenAlgorithm,
    /// Default lifetime of user-voucher tokens.
    pub user_ttl_secs: i64,
    /// Default lifetime of print-voucher tokens.
    pub print_ttl_secs: i64,
    /// How far in the future an `iat` may lie before the token is rejected.
    pub clock_skew_secs: i64,
    /// Remaining lifetime below which a token counts as near expiry.
    pub near_expiry_threshold_secs: i64,
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            issuer: "voucher-redemption".to_string(),
            audience: vec!["voucher-redemption-clients".to_string()],
            algorithm: TokenAlgorithm::ES256,
            user_ttl_secs: DEFAULT_USER_TTL_SECS,
            print_ttl_secs: DEFAULT_PRINT_TTL_SECS,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            near_expiry_threshold_secs: 60,
        }
    }
}

impl RedemptionConfig {
    /// Load from `VRP_*` environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, RedemptionError> {
        let mut config = Self::default();
        if let Ok(issuer) = std::env::var("VRP_ISSUER") {
            config.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("VRP_AUDIENCE") {
            config.audience = audience
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(alg) = std::env::var("VRP_ALGORITHM") {
            config.algorithm = alg.parse()?;
        }
        if let Some(ttl) = env_secs("VRP_USER_TTL_SECS")? {
            config.user_ttl_secs = ttl;
        }
        if let Some(ttl) = env_secs("VRP_PRINT_TTL_SECS")? {
            config.print_ttl_secs = ttl;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot issue verifiable tokens.
    pub fn validate(&self) -> Result<(), RedemptionError> {
        if self.issuer.trim().is_empty() {
            return Err(RedemptionError::Config("issuer must not be empty".into()));
        }
        if self.audience.is_empty() || self.audience.iter().any(|a| a.trim().is_empty()) {
            return Err(RedemptionError::Config(
                "audience must contain at least one non-empty value".into(),
            ));
        }
        if self.user_ttl_secs <= 0 || self.print_ttl_secs <= 0 {
            return Err(RedemptionError::Config("token lifetimes must be positive".into()));
        }
        if self.clock_skew_secs < 0 || self.near_expiry_threshold_secs < 0 {
            return Err(RedemptionError::Config(
                "clock skew and expiry threshold must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// The single audience written into issued tokens.
    pub fn primary_audience(&self) -> &str {
        self.audience.first().map(String::as_str).unwrap_or_default()
    }
}

/// Short-code engine settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortCodeConfig {
    /// HMAC key for code derivation and the integrity anchor.
    pub secret: String,
    /// Record lifetime used when claims carry no `exp`.
    #[serde(default = "default_print_ttl")]
    pub default_ttl_secs: i64,
}

fn default_print_ttl() -> i64 {
    DEFAULT_PRINT_TTL_SECS
}

impl ShortCodeConfig {
    /// Build and validate a config from a provisioned secret.
    pub fn new(secret: impl Into<String>) -> Result<Self, RedemptionError> {
        let config = Self {
            secret: secret.into(),
            default_ttl_secs: DEFAULT_PRINT_TTL_SECS,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load the secret from `VRP_SHORTCODE_SECRET`.
    pub fn from_env() -> Result<Self, RedemptionError> {
        let secret = std::env::var("VRP_SHORTCODE_SECRET").map_err(|_| {
            RedemptionError::Config("environment variable VRP_SHORTCODE_SECRET not set".into())
        })?;
        Self::new(secret)
    }

    /// The secret must be at least [`MIN_SECRET_LEN`] characters.
    pub fn validate(&self) -> Result<(), RedemptionError> {
        let len = self.secret.chars().count();
        if len < MIN_SECRET_LEN {
            return Err(RedemptionError::InvalidKey(format!(
                "short-code secret must be at least {MIN_SECRET_LEN} characters, got {len}"
            )));
        }
        if self.default_ttl_secs <= 0 {
            return Err(RedemptionError::Config(
                "short-code default lifetime must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ShortCodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortCodeConfig")
            .field("secret", &"<redacted>")
            .field("default_ttl_secs", &self.default_ttl_secs)
            .finish()
    }
}

fn env_secs(var: &str) -> Result<Option<i64>, RedemptionError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| RedemptionError::Config(format!("{var} must be an integer: {e}"))),
        Err(_) => Ok(None),
    }
}
