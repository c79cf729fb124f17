//! # fxp-crypto — Signing Collaborator
//!
//! Provides the default signing and verification capability for documents:
//!
//! - **Ed25519** key pairs and signatures.
//! - **did:jwk** identities, self-resolving from the identifier alone, with
//!   an [`IdentityResolver`] seam for other DID methods.
//! - **Detached compact JWS** tokens over a document's content digest.
//! - The [`DigestSigner`] / [`TokenVerifier`] traits the message layer
//!   depends on, with in-memory, environment-loaded and JWS-verifying
//!   implementations.
//!
//! ## Crate Policy
//!
//! - Depends only on `fxp-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   canonical bytes, real SHA-256, real Ed25519.

pub mod did;
pub mod ed25519;
pub mod error;
pub mod jwk;
pub mod jws;
pub mod signer;

pub use did::{did_jwk, DidJwkResolver, IdentityResolver, StaticResolver};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use jwk::Jwk;
pub use jws::{sign_detached, verify_detached, DetachedJws, JwsHeader};
pub use signer::{
    DigestSigner, EnvSigner, JwsVerifier, LocalSigner, TokenVerifier, DEFAULT_SIGNING_KEY_VAR,
};
