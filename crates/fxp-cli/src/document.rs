//! # Document Subcommands
//!
//! `digest`, `sign` and `parse` operate on one document read from a file
//! or stdin. Messages and resources are told apart by `metadata.kind`.
//!
//! ```bash
//! fxp digest rfq.json
//! FXP_SIGNING_KEY=... fxp sign unsigned.json > signed.json
//! fxp parse signed.json --require-private-data
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Args;
use fxp_core::{ContentDigest, MessageKind};
use fxp_crypto::{DigestSigner, EnvSigner, JwsVerifier, DEFAULT_SIGNING_KEY_VAR};
use fxp_message::{signature, AnyMessage, AnyResource, Dispatcher, ParseOptions};
use fxp_schema::SchemaCheck;
use serde_json::{json, Value};

/// Arguments for the digest subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Document file, or `-` for stdin.
    pub input: PathBuf,
}

/// Arguments for the sign subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Unsigned document file, or `-` for stdin.
    pub input: PathBuf,

    /// Environment variable holding the hex signing seed.
    #[arg(long, default_value = DEFAULT_SIGNING_KEY_VAR)]
    pub key_var: String,
}

/// Arguments for the parse subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Document file, or `-` for stdin.
    pub input: PathBuf,

    /// Fail when an RFQ commits to private data it does not carry.
    #[arg(long)]
    pub require_private_data: bool,

    /// Skip signature verification.
    #[arg(long)]
    pub no_verify: bool,
}

/// A decoded message or resource.
#[derive(Debug)]
pub enum Document {
    Message(AnyMessage),
    Resource(AnyResource),
}

impl Document {
    fn summary(&self) -> Result<Value> {
        Ok(match self {
            Document::Message(m) => {
                let md = m.metadata();
                json!({
                    "kind": md.kind.as_str(),
                    "id": md.id.as_str(),
                    "exchangeId": md.exchange_id.as_str(),
                    "from": md.from.as_str(),
                    "to": md.to.as_str(),
                    "digest": m.digest()?.to_string(),
                    "validNext": m.valid_next().iter().map(MessageKind::as_str).collect::<Vec<_>>(),
                })
            }
            Document::Resource(r) => {
                let md = r.metadata();
                json!({
                    "kind": md.kind.as_str(),
                    "id": md.id.as_str(),
                    "from": md.from.as_str(),
                    "digest": r.digest()?.to_string(),
                })
            }
        })
    }

    fn to_json(&self) -> Result<String> {
        Ok(match self {
            Document::Message(m) => m.to_json()?,
            Document::Resource(r) => r.to_json()?,
        })
    }
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let digest = digest_bytes(&crate::read_input(&args.input)?)?;
    println!("{digest}");
    println!("base64url: {}", digest.to_base64url());
    Ok(0)
}

/// Execute the sign subcommand.
pub fn run_sign(args: &SignArgs, schemas: &dyn SchemaCheck) -> Result<u8> {
    let signer = EnvSigner::from_env(&args.key_var)
        .with_context(|| format!("cannot load signing key from {}", args.key_var))?;
    let bytes = crate::read_input(&args.input)?;
    let doc = sign_bytes(&bytes, schemas, &signer)?;
    println!("{}", doc.to_json()?);
    Ok(0)
}

/// Execute the parse subcommand.
pub fn run_parse(args: &ParseArgs, schemas: &dyn SchemaCheck) -> Result<u8> {
    let opts = ParseOptions {
        verify_signature: !args.no_verify,
        require_private_data: args.require_private_data,
    };
    let bytes = crate::read_input(&args.input)?;
    let doc = parse_bytes(&bytes, schemas, &opts)?;
    println!("{}", serde_json::to_string_pretty(&doc.summary()?)?);
    Ok(0)
}

/// Digest of the `{metadata, data}` pair of a raw document.
pub fn digest_bytes(bytes: &[u8]) -> Result<ContentDigest> {
    let value: Value = serde_json::from_slice(bytes).context("document is not JSON")?;
    let (Some(metadata), Some(data)) = (value.get("metadata"), value.get("data")) else {
        bail!("document needs both metadata and data");
    };
    Ok(signature::document_digest(metadata, data)?)
}

/// Decode, then sign with `signer`, which must be `metadata.from`.
pub fn sign_bytes(
    bytes: &[u8],
    schemas: &dyn SchemaCheck,
    signer: &dyn DigestSigner,
) -> Result<Document> {
    let verifier = JwsVerifier::new();
    let dispatcher = Dispatcher::new(schemas, &verifier);
    let mut doc = if is_message(bytes)? {
        Document::Message(dispatcher.decode_message(bytes)?)
    } else {
        Document::Resource(dispatcher.decode_resource(bytes)?)
    };
    let from = match &doc {
        Document::Message(m) => &m.metadata().from,
        Document::Resource(r) => &r.metadata().from,
    };
    if from != signer.identity() {
        bail!(
            "signing key identity {} is not metadata.from {}",
            signer.identity(),
            from
        );
    }
    match &mut doc {
        Document::Message(m) => m.sign(signer)?,
        Document::Resource(r) => r.sign(signer)?,
    }
    Ok(doc)
}

/// Decode and authenticate a message or resource.
pub fn parse_bytes(
    bytes: &[u8],
    schemas: &dyn SchemaCheck,
    opts: &ParseOptions,
) -> Result<Document> {
    let verifier = JwsVerifier::new();
    let dispatcher = Dispatcher::new(schemas, &verifier);
    Ok(if is_message(bytes)? {
        Document::Message(dispatcher.parse_message(bytes, opts)?)
    } else {
        Document::Resource(dispatcher.parse_resource(bytes, opts)?)
    })
}

/// Whether `metadata.kind` names a message kind. Anything else is handed
/// to the resource path, which reports unknown kinds.
fn is_message(bytes: &[u8]) -> Result<bool> {
    let value: Value = serde_json::from_slice(bytes).context("document is not JSON")?;
    let kind = value
        .get("metadata")
        .and_then(|m| m.get("kind"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(MessageKind::from_str(kind).is_ok())
}
