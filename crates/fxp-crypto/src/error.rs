//! # Cryptographic Error Types
//!
//! Structured errors for key handling, identity resolution and signature
//! tokens.

use thiserror::Error;

/// Errors from cryptographic operations in `fxp-crypto`.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid Ed25519 signature length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Signing key material could not be loaded.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The signature token is not a detached compact JWS.
    #[error("malformed signature token: {0}")]
    MalformedToken(String),

    /// The token names an algorithm other than EdDSA.
    #[error("unsupported signature algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// The signer's identity could not be resolved to a key.
    #[error("cannot resolve identity {did}: {reason}")]
    Resolution {
        /// The DID that failed to resolve.
        did: String,
        /// Why it failed.
        reason: String,
    },

    /// base64url or hex decoding failed.
    #[error("decode error: {0}")]
    Decode(String),
}
