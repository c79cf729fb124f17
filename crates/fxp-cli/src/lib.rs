//! # fxp-cli — Command-Line Interface for the Exchange Protocol
//!
//! Provides the `fxp` binary for working with protocol documents outside
//! an application.
//!
//! ## Subcommands
//!
//! - `fxp keygen` — Generate an Ed25519 key and its `did:jwk` identity.
//! - `fxp digest` — Print the signed digest of a document.
//! - `fxp sign` — Sign a document with the key in `FXP_SIGNING_KEY`.
//! - `fxp parse` — Validate and authenticate a document.
//! - `fxp next` — Query the message transition table.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to the domain crates; no protocol logic here.
//! - Documents are written to stdout, logs to stderr.

pub mod document;
pub mod keys;
pub mod transition;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use fxp_schema::SchemaRegistry;

/// Environment variable naming an alternative schema directory.
pub const SCHEMA_DIR_VAR: &str = "FXP_SCHEMA_DIR";

/// Load the schema registry from `schema_dir`, or the embedded schemas.
pub fn load_schemas(schema_dir: Option<&Path>) -> Result<SchemaRegistry> {
    match schema_dir {
        Some(dir) => SchemaRegistry::from_dir(dir)
            .with_context(|| format!("failed to load schemas from {}", dir.display())),
        None => SchemaRegistry::embedded().context("failed to compile embedded schemas"),
    }
}

/// Read a document from `path`, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
