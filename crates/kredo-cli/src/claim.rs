//! # Claim Subcommand
//!
//! - `kredo claim hash --ctype <schema.json> --contents <contents.json> --mnemonic <phrase>`
//!   builds a claim, validates it against the schema, and prints the signed
//!   request for attestation.
//! - `kredo claim verify --request <request.json>` checks a request's hash
//!   tree, root hash and claimer signature.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use kredo_core::ProtocolConfig;
use kredo_schema::CType;
use kredo_vc::{Claim, RequestForAttestation};
use serde_json::Value;

use crate::identity::identity_from;

#[derive(Args, Debug)]
pub struct ClaimArgs {
    #[command(subcommand)]
    pub command: ClaimCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClaimCommand {
    /// Build and sign a request for attestation.
    Hash {
        /// JSON Schema of the CType.
        #[arg(long)]
        ctype: PathBuf,

        /// JSON object with the claim contents.
        #[arg(long)]
        contents: PathBuf,

        /// Claimer's BIP39 mnemonic.
        #[arg(long, env = "KREDO_MNEMONIC", hide_env_values = true)]
        mnemonic: String,

        /// Print the compressed array form instead of the object form.
        #[arg(long)]
        compressed: bool,
    },
    /// Verify the integrity of a request for attestation.
    Verify {
        /// Request as produced by `claim hash`, object or compressed form.
        #[arg(long)]
        request: PathBuf,
    },
}

pub fn run_claim(args: &ClaimArgs, protocol: &ProtocolConfig) -> Result<u8> {
    match &args.command {
        ClaimCommand::Hash {
            ctype,
            contents,
            mnemonic,
            compressed,
        } => {
            let request = hash_claim(ctype, contents, mnemonic)?;
            let out = if *compressed {
                request.compress()?
            } else {
                serde_json::to_value(&request)?
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(0)
        }
        ClaimCommand::Verify { request } => {
            let request = read_request(request)?;
            match request.verify_data_with(protocol) {
                Ok(()) => {
                    println!("OK {}", request.root_hash);
                    Ok(0)
                }
                Err(e) => {
                    println!("FAILED {e}");
                    Ok(1)
                }
            }
        }
    }
}

/// Build the signed request for `contents` under the schema in `ctype`.
pub fn hash_claim(ctype: &Path, contents: &Path, mnemonic: &str) -> Result<RequestForAttestation> {
    let identity = identity_from(mnemonic, false)?;
    let ctype = CType::from_schema(read_json(ctype)?, None).context("invalid CType schema")?;
    let Value::Object(contents) = read_json(contents)? else {
        bail!("claim contents must be a JSON object");
    };
    let claim = Claim::from_ctype_and_contents(&ctype, contents, *identity.address())?;
    tracing::info!(ctype_hash = %ctype.hash(), fields = claim.contents.len(), "claim built");
    Ok(RequestForAttestation::build(&claim, &identity, vec![], None)?)
}

fn read_request(path: &Path) -> Result<RequestForAttestation> {
    let value = read_json(path)?;
    if value.is_array() {
        return Ok(RequestForAttestation::decompress(value)?);
    }
    Ok(serde_json::from_value(value)?)
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}
