//! # kredo-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `mnemonic` — generate a 12-word BIP39 mnemonic
//! - `identity` — derive address and box key from a mnemonic
//! - `claim hash` — build and sign a request for attestation
//! - `claim verify` — check the integrity of a request for attestation
//! - `demo` — run the claimer / attester / verifier flow end to end
//!
//! Argument parsing lives here next to each handler; protocol logic stays
//! in the library crates.

pub mod claim;
pub mod config;
pub mod demo;
pub mod identity;
