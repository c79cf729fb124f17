//! # Next Subcommand
//!
//! Queries the message transition table.
//!
//! ```bash
//! fxp next quote            # kinds that may follow a quote
//! fxp next quote order      # exit 0 if order may follow quote, 1 if not
//! ```

use anyhow::Result;
use clap::Args;
use fxp_core::MessageKind;
use fxp_state::registry;

/// Arguments for the next subcommand.
#[derive(Args, Debug)]
pub struct NextArgs {
    /// Kind of the latest message.
    pub current: String,
    /// Kind to check against `current`.
    pub candidate: Option<String>,
}

/// Execute the next subcommand.
pub fn run_next(args: &NextArgs) -> Result<u8> {
    match &args.candidate {
        Some(candidate) => {
            let valid = registry::is_valid_next_str(&args.current, candidate);
            println!("{}", if valid { "valid" } else { "invalid" });
            Ok(if valid { 0 } else { 1 })
        }
        None => {
            let kinds = next_kinds(&args.current)?;
            if kinds.is_empty() {
                println!("{} is terminal", args.current);
            }
            for kind in kinds {
                println!("{kind}");
            }
            Ok(0)
        }
    }
}

fn next_kinds(current: &str) -> Result<&'static [MessageKind]> {
    let entry = registry::lookup(current)
        .ok_or_else(|| anyhow::anyhow!("unknown message kind: {current:?}"))?;
    Ok(entry.valid_next)
}
