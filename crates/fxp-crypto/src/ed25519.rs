//! # Ed25519 Signing and Verification
//!
//! Ed25519 key generation, signing and verification for document signature
//! tokens.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be a [`JwsSigningInput`], which can only be built
//!   from a `ContentDigest`. You cannot sign arbitrary bytes, so every
//!   signature in the protocol covers a canonical digest.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize` and its `Debug` output hides the key.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as unpadded base64url strings, the
//! encoding used by JWK and JWS.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CryptoError;
use crate::jws::JwsSigningInput;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize`: private keys must not end up in logs or
/// documents.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ─── Ed25519PublicKey ────────────────────────────────────────────────

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encode as unpadded base64url (the JWK `x` member).
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Decode from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::Decode(format!("public key: {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {}", b.len()))
        })?;
        Ok(Self(arr))
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Verify a signature over a JWS signing input.
    pub fn verify(
        &self,
        input: &JwsSigningInput,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        let vk = self.to_verifying_key()?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify(input.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = self.to_base64url();
        write!(f, "Ed25519PublicKey({}...)", &encoded[..8])
    }
}

// ─── Ed25519Signature ────────────────────────────────────────────────

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Encode as unpadded base64url.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Decode from unpadded base64url.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::Decode(format!("signature: {e}")))?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CryptoError::InvalidSignatureLength(b.len()))?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = self.to_base64url();
        write!(f, "Ed25519Signature({}...)", &encoded[..8])
    }
}

// ─── Ed25519KeyPair ──────────────────────────────────────────────────

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key pair from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Create a key pair from a 64-character hex seed.
    pub fn from_hex_seed(seed_hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(seed_hex.trim())
            .map_err(|e| CryptoError::InvalidSigningKey(format!("seed is not hex: {e}")))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            CryptoError::InvalidSigningKey(format!(
                "expected 32 bytes (64 hex chars), got {} bytes",
                b.len()
            ))
        })?;
        Ok(Self::from_seed(&seed))
    }

    /// The 32-byte seed as hex, for exporting a freshly generated key.
    pub fn seed_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a JWS signing input.
    pub fn sign(&self, input: &JwsSigningInput) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(input.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jws::JwsHeader;
    use fxp_core::digest_of;

    fn input(value: serde_json::Value) -> JwsSigningInput {
        let digest = digest_of(&value).unwrap();
        let header = JwsHeader::eddsa("did:ex:alice#0");
        JwsSigningInput::new(&header, &digest).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let msg = input(serde_json::json!({"kind": "rfq"}));
        let sig = kp.sign(&msg);
        assert!(kp.public_key().verify(&msg, &sig).is_ok());
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let msg = input(serde_json::json!({"kind": "rfq"}));
        let sig = kp1.sign(&msg);
        assert!(kp2.public_key().verify(&msg, &sig).is_err());
    }

    #[test]
    fn test_different_input_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&input(serde_json::json!({"amount": "100"})));
        let other = input(serde_json::json!({"amount": "101"}));
        assert!(kp.public_key().verify(&other, &sig).is_err());
    }

    #[test]
    fn test_from_seed_deterministic() {
        let seed = [7u8; 32];
        let a = Ed25519KeyPair::from_seed(&seed);
        let b = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(a.public_key(), b.public_key());
        let msg = input(serde_json::json!({}));
        assert_eq!(a.sign(&msg), b.sign(&msg));
    }

    #[test]
    fn test_hex_seed_roundtrip() {
        let kp = Ed25519KeyPair::generate();
        let restored = Ed25519KeyPair::from_hex_seed(&kp.seed_hex()).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn test_hex_seed_rejects_bad_input() {
        assert!(Ed25519KeyPair::from_hex_seed("zz").is_err());
        assert!(Ed25519KeyPair::from_hex_seed("abcd").is_err());
    }

    #[test]
    fn test_public_key_base64url() {
        let pk = Ed25519KeyPair::from_seed(&[1u8; 32]).public_key();
        let encoded = pk.to_base64url();
        assert_eq!(encoded.len(), 43);
        assert_eq!(Ed25519PublicKey::from_base64url(&encoded).unwrap(), pk);
        assert!(Ed25519PublicKey::from_base64url("AAAA").is_err());
    }

    #[test]
    fn test_signature_length_checked() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 10]);
        assert!(matches!(
            Ed25519Signature::from_base64url(&short),
            Err(CryptoError::InvalidSignatureLength(10))
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let kp = Ed25519KeyPair::from_seed(&[9u8; 32]);
        let dbg = format!("{kp:?}");
        assert_eq!(dbg, "Ed25519KeyPair(<private>)");
        assert!(!dbg.contains(&kp.seed_hex()));
    }
}
