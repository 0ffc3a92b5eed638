//! # kredo CLI entry point
//!
//! Parses arguments, loads the optional config file, installs the tracing
//! subscriber and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kredo_cli::claim::{run_claim, ClaimArgs};
use kredo_cli::config::{KredoConfig, LogConfig, LogFormat};
use kredo_cli::demo::{run_demo, DemoArgs};
use kredo_cli::identity::{run_identity, run_mnemonic, IdentityArgs, MnemonicArgs};

/// kredo: claims, attestations and verifiable presentations.
#[derive(Parser, Debug)]
#[command(name = "kredo", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true, env = "KREDO_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Override the configured legitimation depth bound.
    #[arg(long, global = true)]
    max_legitimation_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a 12-word BIP39 mnemonic.
    Mnemonic(MnemonicArgs),

    /// Show the identity derived from a mnemonic.
    Identity(IdentityArgs),

    /// Build or check requests for attestation.
    Claim(ClaimArgs),

    /// Run the claimer / attester / verifier flow end to end.
    Demo(DemoArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match KredoConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    if cli.log_json {
        config.log.format = LogFormat::Json;
    }
    if let Some(depth) = cli.max_legitimation_depth {
        config.protocol.max_legitimation_depth = depth;
    }
    init_tracing(cli.verbose, &config.log);

    tracing::debug!(?config, "kredo CLI starting");

    let result = match cli.command {
        Commands::Mnemonic(args) => run_mnemonic(&args),
        Commands::Identity(args) => run_identity(&args),
        Commands::Claim(args) => run_claim(&args, &config.protocol),
        Commands::Demo(args) => run_demo(&args, &config.protocol, &config.ledger),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins, then `-v`, then the config file filter, then `warn`.
fn init_tracing(verbose: u8, log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => log
            .filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_claim_hash() {
        let cli = Cli::try_parse_from([
            "kredo",
            "claim",
            "hash",
            "--ctype",
            "schema.json",
            "--contents",
            "contents.json",
            "--mnemonic",
            "abandon abandon",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Claim(_)));
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from(["kredo", "-vv", "demo", "--log-json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Demo(_)));
    }
}
