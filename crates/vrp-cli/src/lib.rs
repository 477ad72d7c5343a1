//! # vrp-cli — CLI for Voucher Redemption Proofs
//!
//! Provides the `vrp` command-line interface.
//!
//! ## Subcommands
//!
//! - `vrp keys`: key-pair generation, rotation and checking; short-code
//!   secret generation. Provisioning-time only.
//! - `vrp inspect`: decode a QR payload without verifying it.
//!
//! ```bash
//! vrp keys keygen --output keys/ --algorithm ES256
//! vrp keys secret --length 48
//! vrp keys check --key keys/vrp.key.pem --pubkey keys/vrp.pub.pem
//! vrp inspect <PAYLOAD>
//! ```

pub mod inspect;
pub mod keys;

use std::path::Path;

use anyhow::{bail, Context, Result};
use vrp_core::RedemptionConfig;

/// Load issuer configuration from a JSON file, or from `VRP_*` environment
/// variables when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<RedemptionConfig> {
    let Some(path) = path else {
        return RedemptionConfig::from_env().context("invalid VRP_* environment configuration");
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: RedemptionConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(config)
}

/// Read a PEM file, failing early with the path in the message.
pub fn read_pem(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("key file not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read key: {}", path.display()))
}
