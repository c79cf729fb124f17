//! # Signing and Verification Capabilities
//!
//! The two seams the message layer signs and verifies through:
//!
//! - [`DigestSigner`]: digest → opaque signature token, plus the signer's
//!   own identity.
//! - [`TokenVerifier`]: (token, digest) → recovered signer identity.
//!
//! Implementations:
//!
//! - [`LocalSigner`]: in-memory key for development and testing.
//! - [`EnvSigner`]: loads key material from an environment variable
//!   (hex-encoded 32-byte Ed25519 seed), for deployments where secrets are
//!   injected via environment.
//! - [`JwsVerifier`]: verifies detached JWS tokens, resolving the signer
//!   through an [`IdentityResolver`].
//!
//! ## Security Invariants
//!
//! - Both traits are `Send + Sync`; signing and verifying unrelated
//!   documents concurrently is always safe.
//! - Signing input is a `ContentDigest`, never raw bytes.

use fxp_core::{ContentDigest, Did};

use crate::did::{did_jwk, DidJwkResolver, IdentityResolver};
use crate::ed25519::Ed25519KeyPair;
use crate::error::CryptoError;
use crate::jws;

/// Environment variable the CLI reads the signing seed from by default.
pub const DEFAULT_SIGNING_KEY_VAR: &str = "FXP_SIGNING_KEY";

/// Signs document digests.
pub trait DigestSigner: Send + Sync {
    /// Produce a signature token over `digest`.
    fn sign_digest(&self, digest: &ContentDigest) -> Result<String, CryptoError>;

    /// The identity the produced tokens verify as.
    fn identity(&self) -> &Did;
}

/// Verifies signature tokens against document digests.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` over `digest` and return the signer identity.
    fn verify_token(&self, token: &str, digest: &ContentDigest) -> Result<Did, CryptoError>;
}

// ─── LocalSigner ─────────────────────────────────────────────────────

/// In-memory Ed25519 signer with a `did:jwk` identity.
#[derive(Debug)]
pub struct LocalSigner {
    key: Ed25519KeyPair,
    did: Did,
}

impl LocalSigner {
    /// Wrap an existing key pair.
    pub fn new(key: Ed25519KeyPair) -> Result<Self, CryptoError> {
        let did = did_jwk(&key.public_key())?;
        Ok(Self { key, did })
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::new(Ed25519KeyPair::generate())
    }

    /// Create from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    /// The underlying key pair.
    pub fn key_pair(&self) -> &Ed25519KeyPair {
        &self.key
    }

    /// The verification method id placed in token headers.
    pub fn kid(&self) -> String {
        format!("{}#0", self.did)
    }
}

impl DigestSigner for LocalSigner {
    fn sign_digest(&self, digest: &ContentDigest) -> Result<String, CryptoError> {
        jws::sign_detached(&self.key, &self.kid(), digest)
    }

    fn identity(&self) -> &Did {
        &self.did
    }
}

// ─── EnvSigner ───────────────────────────────────────────────────────

/// Loads an Ed25519 signing key from an environment variable.
///
/// The variable must contain a 64-character hex string encoding the
/// 32-byte seed. The key is loaded once at construction.
///
/// ```bash
/// export FXP_SIGNING_KEY="9d61b19d..."  # 64 hex chars
/// ```
#[derive(Debug)]
pub struct EnvSigner {
    inner: LocalSigner,
    var_name: String,
}

impl EnvSigner {
    /// Load the signing key from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSigningKey`] if the variable is unset
    /// or does not hold a 32-byte hex seed.
    pub fn from_env(var_name: &str) -> Result<Self, CryptoError> {
        let seed = std::env::var(var_name).map_err(|_| {
            CryptoError::InvalidSigningKey(format!("environment variable {var_name} not set"))
        })?;
        let key = Ed25519KeyPair::from_hex_seed(&seed)
            .map_err(|e| CryptoError::InvalidSigningKey(format!("{var_name}: {e}")))?;
        Ok(Self {
            inner: LocalSigner::new(key)?,
            var_name: var_name.to_string(),
        })
    }

    /// The environment variable this signer was loaded from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl DigestSigner for EnvSigner {
    fn sign_digest(&self, digest: &ContentDigest) -> Result<String, CryptoError> {
        self.inner.sign_digest(digest)
    }

    fn identity(&self) -> &Did {
        self.inner.identity()
    }
}

// ─── JwsVerifier ─────────────────────────────────────────────────────

/// Verifies detached JWS tokens.
#[derive(Debug, Clone, Default)]
pub struct JwsVerifier<R = DidJwkResolver> {
    resolver: R,
}

impl<R: IdentityResolver> JwsVerifier<R> {
    /// Verify with a custom identity resolver.
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }
}

impl JwsVerifier<DidJwkResolver> {
    /// Verifier for `did:jwk` signers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: IdentityResolver> TokenVerifier for JwsVerifier<R> {
    fn verify_token(&self, token: &str, digest: &ContentDigest) -> Result<Did, CryptoError> {
        jws::verify_detached(token, digest, &self.resolver)
    }
}
