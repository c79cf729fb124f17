//! # Keygen Subcommand
//!
//! Generates an Ed25519 key and prints its seed and `did:jwk` identity.
//! The seed is printed in the format `FXP_SIGNING_KEY` expects.

use anyhow::Result;
use clap::Args;
use fxp_crypto::{DigestSigner, LocalSigner, DEFAULT_SIGNING_KEY_VAR};
use serde_json::{json, Value};

/// Arguments for the keygen subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Print only the `export` line for the shell.
    #[arg(long)]
    pub export: bool,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let signer = LocalSigner::generate()?;
    if args.export {
        println!(
            "export {DEFAULT_SIGNING_KEY_VAR}={}",
            signer.key_pair().seed_hex()
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&describe(&signer))?);
    }
    tracing::debug!(did = %signer.identity(), "key generated");
    Ok(0)
}

fn describe(signer: &LocalSigner) -> Value {
    json!({
        "did": signer.identity().as_str(),
        "kid": signer.kid(),
        "seed": signer.key_pair().seed_hex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxp_crypto::Ed25519KeyPair;

    #[test]
    fn test_describe_round_trips_seed() {
        let signer = LocalSigner::from_seed(&[7; 32]).unwrap();
        let out = describe(&signer);
        let seed = out["seed"].as_str().unwrap();
        let restored = LocalSigner::new(Ed25519KeyPair::from_hex_seed(seed).unwrap()).unwrap();
        assert_eq!(restored.identity(), signer.identity());
        assert!(out["did"].as_str().unwrap().starts_with("did:jwk:"));
        assert!(out["kid"].as_str().unwrap().ends_with("#0"));
    }
}
