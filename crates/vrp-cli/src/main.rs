//! # vrp CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vrp_cli::inspect::{run_inspect, InspectArgs};
use vrp_cli::keys::{run_keys, KeysArgs};
use vrp_cli::load_config;

/// Voucher redemption proofs.
///
/// Provisions ECDSA keys and short-code secrets, and decodes the signed
/// payloads carried by voucher QR codes.
#[derive(Parser, Debug)]
#[command(name = "vrp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a JSON issuer configuration file. Falls back to `VRP_*`
    /// environment variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Key pair and short-code secret provisioning.
    Keys(KeysArgs),

    /// Decode a QR payload without verifying it.
    Inspect(InspectArgs),
}

fn env_filter(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "vrp CLI starting");

    let result = match &cli.command {
        Commands::Keys(args) => run_keys(args),
        Commands::Inspect(args) => {
            load_config(cli.config.as_deref()).and_then(|config| run_inspect(args, config))
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
