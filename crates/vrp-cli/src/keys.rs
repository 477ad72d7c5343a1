//! # Keys Subcommand
//!
//! Provisioning-time generation of the material the runtime consumes: ECDSA
//! key pairs for token signing and the HMAC secret for short codes.
//!
//! ## Security Invariant
//!
//! Private keys are written to files only, never to stdout or logs. On Unix
//! the private key file is created with mode `0600`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use vrp_core::TokenAlgorithm;
use vrp_crypto::{generate_key_pair, generate_secret, rotate_key_pair, Curve, KeyPair};

use crate::read_pem;

/// Arguments for the `vrp keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub command: KeysCommand,
}

/// Key subcommands.
#[derive(Subcommand, Debug)]
pub enum KeysCommand {
    /// Generate a new ECDSA key pair (PKCS#8 private, SPKI public PEM).
    Keygen {
        /// Output directory for the key files.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Prefix for the key filenames.
        #[arg(long, default_value = "vrp")]
        prefix: String,
        /// Signature algorithm: ES256 or ES384.
        #[arg(long, default_value = "ES256")]
        algorithm: TokenAlgorithm,
    },

    /// Generate a random short-code secret.
    Secret {
        /// Length in characters (at least 32).
        #[arg(long, default_value_t = 48)]
        length: usize,
    },

    /// Check that a private and public key parse for the algorithm and
    /// belong together.
    Check {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        pubkey: PathBuf,
        #[arg(long, default_value = "ES256")]
        algorithm: TokenAlgorithm,
    },

    /// Replace a key pair with a new one on the same curve. The retired
    /// public key is kept next to the new pair for verifying old tokens.
    Rotate {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        pubkey: PathBuf,
        #[arg(long, default_value = "ES256")]
        algorithm: TokenAlgorithm,
        /// Output directory for the new pair.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
        /// Prefix for the new key filenames.
        #[arg(long, default_value = "vrp")]
        prefix: String,
    },
}

/// Execute the keys subcommand.
pub fn run_keys(args: &KeysArgs) -> Result<u8> {
    match &args.command {
        KeysCommand::Keygen {
            output,
            prefix,
            algorithm,
        } => cmd_keygen(output, prefix, *algorithm),
        KeysCommand::Secret { length } => cmd_secret(*length),
        KeysCommand::Check {
            key,
            pubkey,
            algorithm,
        } => cmd_check(key, pubkey, *algorithm),
        KeysCommand::Rotate {
            key,
            pubkey,
            algorithm,
            output,
            prefix,
        } => cmd_rotate(key, pubkey, *algorithm, output, prefix),
    }
}

fn key_paths(output_dir: &Path, prefix: &str) -> (PathBuf, PathBuf) {
    (
        output_dir.join(format!("{prefix}.key.pem")),
        output_dir.join(format!("{prefix}.pub.pem")),
    )
}

fn write_pair(pair: &KeyPair, output_dir: &Path, prefix: &str) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;
    let (key_path, pub_path) = key_paths(output_dir, prefix);
    write_private(&key_path, pair.private_key())?;
    std::fs::write(&pub_path, pair.public_key())
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;
    Ok((key_path, pub_path))
}

#[cfg(unix)]
fn write_private(path: &Path, pem: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("failed to create private key: {}", path.display()))?;
    file.write_all(pem.as_bytes())
        .with_context(|| format!("failed to write private key: {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, pem: &str) -> Result<()> {
    std::fs::write(path, pem)
        .with_context(|| format!("failed to write private key: {}", path.display()))
}

fn cmd_keygen(output_dir: &Path, prefix: &str, algorithm: TokenAlgorithm) -> Result<u8> {
    let pair = generate_key_pair(Curve::from_algorithm(algorithm))?;
    let (key_path, pub_path) = write_pair(&pair, output_dir, prefix)?;

    println!("OK: generated {algorithm} key pair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    Ok(0)
}

fn cmd_secret(length: usize) -> Result<u8> {
    let secret = generate_secret(length)?;
    println!("{secret}");
    Ok(0)
}

fn load_pair(key: &Path, pubkey: &Path, algorithm: TokenAlgorithm) -> Result<KeyPair> {
    let pair = KeyPair::from_pem(read_pem(key)?, read_pem(pubkey)?, algorithm)?;
    Ok(pair)
}

fn cmd_check(key: &Path, pubkey: &Path, algorithm: TokenAlgorithm) -> Result<u8> {
    match load_pair(key, pubkey, algorithm) {
        Ok(_) => {
            println!("OK: {algorithm} key pair is consistent");
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {e:#}");
            Ok(1)
        }
    }
}

fn cmd_rotate(
    key: &Path,
    pubkey: &Path,
    algorithm: TokenAlgorithm,
    output_dir: &Path,
    prefix: &str,
) -> Result<u8> {
    let current = load_pair(key, pubkey, algorithm).context("current key pair rejected")?;
    let rotation = rotate_key_pair(&current)?;

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            output_dir.display()
        )
    })?;
    let retired_path = output_dir.join(format!("{prefix}.retired.pub.pem"));
    std::fs::write(&retired_path, &rotation.previous_public_key)
        .with_context(|| format!("failed to write retired key: {}", retired_path.display()))?;
    let (key_path, pub_path) = write_pair(&rotation.next, output_dir, prefix)?;

    println!("OK: rotated {algorithm} key pair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Retired public key: {}", retired_path.display());
    Ok(0)
}
