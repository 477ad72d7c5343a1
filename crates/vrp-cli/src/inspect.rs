//! # Inspect Subcommand
//!
//! Decodes a QR payload without verifying it, for support and debugging.
//! The expiry flags are computed against the configured issuer's clock.

use anyhow::{Context, Result};
use clap::Args;
use vrp_core::RedemptionConfig;
use vrp_qr::QrService;

/// Arguments for the `vrp inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Compact payload read from a QR code.
    #[arg(value_name = "PAYLOAD")]
    pub payload: String,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, config: RedemptionConfig) -> Result<u8> {
    let service = QrService::with_system_clock(config).context("invalid issuer configuration")?;
    inspect_payload(&service, &args.payload)
}

fn inspect_payload(service: &QrService, payload: &str) -> Result<u8> {
    match service.extract_qr_metadata(payload.trim()) {
        Some(info) => {
            println!("{}", serde_json::to_string_pretty(&info)?);
            tracing::debug!(voucher_id = %info.voucher_id, "inspected payload");
            Ok(0)
        }
        None => {
            println!("FAIL: payload could not be decoded");
            Ok(1)
        }
    }
}
