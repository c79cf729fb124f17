//! # Detached Compact JWS
//!
//! The signature token carried in a document's `signature` field.
//!
//! ```text
//! base64url(header) ".." base64url(signature)
//! ```
//!
//! The payload segment is empty: the payload is the document digest, which
//! the verifier recomputes from the document itself. The header is
//! `{"alg":"EdDSA","kid":"<did>#<fragment>"}` and the Ed25519 signature
//! covers `base64url(header) "." base64url(digest)`.
//!
//! ## Security Invariant
//!
//! Verification uses the header segment exactly as transmitted. The header
//! is never re-serialized before checking the signature.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fxp_core::{ContentDigest, Did};
use serde::{Deserialize, Serialize};

use crate::did::IdentityResolver;
use crate::ed25519::{Ed25519KeyPair, Ed25519Signature};
use crate::error::CryptoError;

/// The only algorithm accepted in token headers.
pub const ALG_EDDSA: &str = "EdDSA";

/// Protected header of a signature token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm.
    pub alg: String,
    /// Verification method: `<did>#<fragment>`.
    pub kid: String,
}

impl JwsHeader {
    /// An EdDSA header for the given verification method id.
    pub fn eddsa(kid: impl Into<String>) -> Self {
        Self {
            alg: ALG_EDDSA.to_string(),
            kid: kid.into(),
        }
    }

    /// The DID portion of `kid` (everything before `#`).
    pub fn signer(&self) -> Result<Did, CryptoError> {
        let did = self.kid.split('#').next().unwrap_or_default();
        Did::new(did).map_err(|e| CryptoError::MalformedToken(format!("kid: {e}")))
    }
}

/// The exact bytes an Ed25519 signature covers.
///
/// Only constructible from a header and a `ContentDigest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwsSigningInput(Vec<u8>);

impl JwsSigningInput {
    /// Build the signing input for a fresh header.
    pub fn new(header: &JwsHeader, digest: &ContentDigest) -> Result<Self, CryptoError> {
        let json = serde_json::to_vec(header)
            .map_err(|e| CryptoError::MalformedToken(format!("header: {e}")))?;
        Ok(Self::from_encoded_header(&URL_SAFE_NO_PAD.encode(json), digest))
    }

    /// Build the signing input around an already-encoded header segment.
    pub fn from_encoded_header(header_b64: &str, digest: &ContentDigest) -> Self {
        let input = format!("{header_b64}.{}", digest.to_base64url());
        Self(input.into_bytes())
    }

    /// The raw signing input.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn encoded_header(&self) -> &[u8] {
        let end = self.0.iter().position(|b| *b == b'.').unwrap_or(self.0.len());
        &self.0[..end]
    }
}

/// A parsed detached token.
#[derive(Debug, Clone)]
pub struct DetachedJws {
    /// The decoded protected header.
    pub header: JwsHeader,
    header_b64: String,
    signature: Ed25519Signature,
}

impl DetachedJws {
    /// Parse a compact token with an empty payload segment.
    pub fn parse(token: &str) -> Result<Self, CryptoError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_b64, payload, sig_b64] = parts.as_slice() else {
            return Err(CryptoError::MalformedToken(format!(
                "expected 3 segments, got {}",
                parts.len()
            )));
        };
        if !payload.is_empty() {
            return Err(CryptoError::MalformedToken(
                "payload segment must be empty (detached)".to_string(),
            ));
        }
        let header_json = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|e| CryptoError::MalformedToken(format!("header is not base64url: {e}")))?;
        let header: JwsHeader = serde_json::from_slice(&header_json)
            .map_err(|e| CryptoError::MalformedToken(format!("header: {e}")))?;
        if header.alg != ALG_EDDSA {
            return Err(CryptoError::UnsupportedAlgorithm(header.alg));
        }
        let signature = Ed25519Signature::from_base64url(sig_b64)?;
        Ok(Self {
            header,
            header_b64: (*header_b64).to_string(),
            signature,
        })
    }

    /// Verify this token against `digest`, returning the signer DID.
    pub fn verify(
        &self,
        digest: &ContentDigest,
        resolver: &dyn IdentityResolver,
    ) -> Result<Did, CryptoError> {
        let signer = self.header.signer()?;
        let key = resolver.resolve(&signer)?;
        let input = JwsSigningInput::from_encoded_header(&self.header_b64, digest);
        key.verify(&input, &self.signature)?;
        Ok(signer)
    }
}

/// Produce a detached token over `digest`.
pub fn sign_detached(
    key: &Ed25519KeyPair,
    kid: &str,
    digest: &ContentDigest,
) -> Result<String, CryptoError> {
    let header = JwsHeader::eddsa(kid);
    let input = JwsSigningInput::new(&header, digest)?;
    let signature = key.sign(&input);
    let header_b64 = String::from_utf8_lossy(input.encoded_header()).into_owned();
    Ok(format!("{header_b64}..{}", signature.to_base64url()))
}

/// Parse and verify a detached token, returning the signer DID.
pub fn verify_detached(
    token: &str,
    digest: &ContentDigest,
    resolver: &dyn IdentityResolver,
) -> Result<Did, CryptoError> {
    DetachedJws::parse(token)?.verify(digest, resolver)
}
