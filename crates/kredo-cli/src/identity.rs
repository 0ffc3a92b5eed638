//! # Identity Subcommands
//!
//! - `kredo mnemonic` — print a fresh 12-word mnemonic.
//! - `kredo identity --mnemonic <phrase>` — print the derived address and
//!   box public key as JSON.

use anyhow::{Context, Result};
use clap::Args;
use kredo_crypto::{generate_mnemonic, Identity, IdentityOptions};
use serde_json::json;

#[derive(Args, Debug)]
pub struct MnemonicArgs {}

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// BIP39 mnemonic (English, 12 words or more).
    #[arg(long, env = "KREDO_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,

    /// Also derive the privacy-enhancement secret.
    #[arg(long)]
    pub privacy_enhanced: bool,
}

pub fn run_mnemonic(_args: &MnemonicArgs) -> Result<u8> {
    let phrase = generate_mnemonic().context("failed to generate mnemonic")?;
    println!("{phrase}");
    Ok(0)
}

pub fn run_identity(args: &IdentityArgs) -> Result<u8> {
    let identity = identity_from(&args.mnemonic, args.privacy_enhanced)?;
    let public = identity.public_identity();
    let out = json!({
        "address": public.address,
        "boxPublicKey": public.box_public_key,
        "privacyEnhanced": identity.is_privacy_enabled(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(0)
}

/// Derive an identity, reporting a bad phrase without echoing it.
pub fn identity_from(mnemonic: &str, privacy_enhanced: bool) -> Result<Identity> {
    Identity::from_mnemonic_with_options(mnemonic, IdentityOptions { privacy_enhanced })
        .context("invalid mnemonic")
}
