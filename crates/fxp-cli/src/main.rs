//! # fxp CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fxp_cli::document::{run_digest, run_parse, run_sign, DigestArgs, ParseArgs, SignArgs};
use fxp_cli::keys::{run_keygen, KeygenArgs};
use fxp_cli::transition::{run_next, NextArgs};
use fxp_cli::{load_schemas, SCHEMA_DIR_VAR};

/// FX exchange protocol toolkit.
///
/// Generates keys, digests, signs and verifies protocol documents, and
/// answers transition-table queries.
#[derive(Parser, Debug)]
#[command(name = "fxp", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Load schemas from this directory instead of the embedded set.
    #[arg(long, global = true, env = SCHEMA_DIR_VAR)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key and its did:jwk identity.
    Keygen(KeygenArgs),

    /// Print the signed digest of a document.
    Digest(DigestArgs),

    /// Sign a document as its metadata.from identity.
    Sign(SignArgs),

    /// Validate a document and verify its signature and disclosures.
    Parse(ParseArgs),

    /// Show which message kinds may follow another.
    Next(NextArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Digest(args) => run_digest(&args),
        Commands::Next(args) => run_next(&args),
        Commands::Sign(args) => {
            let schemas = load_schemas(cli.schema_dir.as_deref())?;
            run_sign(&args, &schemas)
        }
        Commands::Parse(args) => {
            let schemas = load_schemas(cli.schema_dir.as_deref())?;
            run_parse(&args, &schemas)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
