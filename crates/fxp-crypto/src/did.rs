//! # Identity Resolution
//!
//! Maps a party's DID to the Ed25519 key that verifies its signatures.
//!
//! `did:jwk` identifiers are self-resolving: the method-specific id is the
//! base64url encoding of the JWK itself, so no network or registry lookup
//! is needed. Other methods can be served from a [`StaticResolver`] that is
//! populated out of band.

use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fxp_core::{CanonicalBytes, Did};

use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;
use crate::jwk::Jwk;

/// Resolves a DID to its verification key.
///
/// Implementations must be `Send + Sync`; resolution is read-only.
pub trait IdentityResolver: Send + Sync {
    /// Resolve `did` to the Ed25519 key bound to it.
    fn resolve(&self, did: &Did) -> Result<Ed25519PublicKey, CryptoError>;
}

/// Create the `did:jwk` identity for a public key.
///
/// The JWK is canonicalized before encoding, so the same key always yields
/// the same DID.
pub fn did_jwk(key: &Ed25519PublicKey) -> Result<Did, CryptoError> {
    let jwk = Jwk::from_public_key(key);
    let canonical = CanonicalBytes::new(&jwk)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
    let encoded = URL_SAFE_NO_PAD.encode(canonical.as_bytes());
    Did::new(format!("did:jwk:{encoded}")).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Resolver for self-describing `did:jwk` identities.
#[derive(Debug, Clone, Copy, Default)]
pub struct DidJwkResolver;

impl IdentityResolver for DidJwkResolver {
    fn resolve(&self, did: &Did) -> Result<Ed25519PublicKey, CryptoError> {
        let fail = |reason: String| CryptoError::Resolution {
            did: did.to_string(),
            reason,
        };
        if did.method() != "jwk" {
            return Err(fail(format!("method {:?} is not did:jwk", did.method())));
        }
        let json = URL_SAFE_NO_PAD
            .decode(did.method_specific_id())
            .map_err(|e| fail(format!("identifier is not base64url: {e}")))?;
        let jwk: Jwk =
            serde_json::from_slice(&json).map_err(|e| fail(format!("identifier is not a JWK: {e}")))?;
        jwk.to_public_key().map_err(|e| fail(e.to_string()))
    }
}

/// Resolver backed by a fixed DID → key map.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    keys: HashMap<Did, Ed25519PublicKey>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key for `did`, replacing any earlier one.
    pub fn insert(&mut self, did: Did, key: Ed25519PublicKey) {
        self.keys.insert(did, key);
    }

    /// Builder form of [`StaticResolver::insert`].
    pub fn with(mut self, did: Did, key: Ed25519PublicKey) -> Self {
        self.insert(did, key);
        self
    }
}

impl IdentityResolver for StaticResolver {
    fn resolve(&self, did: &Did) -> Result<Ed25519PublicKey, CryptoError> {
        self.keys.get(did).cloned().ok_or_else(|| CryptoError::Resolution {
            did: did.to_string(),
            reason: "no key registered".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519KeyPair;

    #[test]
    fn test_did_jwk_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let did = did_jwk(&pk).unwrap();
        assert_eq!(did.method(), "jwk");
        assert_eq!(DidJwkResolver.resolve(&did).unwrap(), pk);
    }

    #[test]
    fn test_did_jwk_deterministic() {
        let pk = Ed25519KeyPair::from_seed(&[3u8; 32]).public_key();
        assert_eq!(did_jwk(&pk).unwrap(), did_jwk(&pk).unwrap());
    }

    #[test]
    fn test_did_jwk_encodes_canonical_jwk() {
        let pk = Ed25519KeyPair::from_seed(&[3u8; 32]).public_key();
        let did = did_jwk(&pk).unwrap();
        let json = URL_SAFE_NO_PAD.decode(did.method_specific_id()).unwrap();
        let expected = format!(r#"{{"crv":"Ed25519","kty":"OKP","x":"{}"}}"#, pk.to_base64url());
        assert_eq!(String::from_utf8(json).unwrap(), expected);
    }

    #[test]
    fn test_did_jwk_resolver_rejects_other_methods() {
        let did = Did::new("did:web:pfi.example").unwrap();
        assert!(matches!(
            DidJwkResolver.resolve(&did),
            Err(CryptoError::Resolution { .. })
        ));
    }

    #[test]
    fn test_did_jwk_resolver_rejects_garbage() {
        let did = Did::new("did:jwk:not-a-jwk").unwrap();
        assert!(DidJwkResolver.resolve(&did).is_err());
    }

    #[test]
    fn test_static_resolver() {
        let pk = Ed25519KeyPair::generate().public_key();
        let did = Did::new("did:web:pfi.example").unwrap();
        let resolver = StaticResolver::new().with(did.clone(), pk.clone());
        assert_eq!(resolver.resolve(&did).unwrap(), pk);
        let unknown = Did::new("did:web:other.example").unwrap();
        assert!(resolver.resolve(&unknown).is_err());
    }
}
