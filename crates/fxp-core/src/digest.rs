//! # Content Digest — SHA-256 over Canonical Bytes
//!
//! Defines `ContentDigest`, the fixed-size 256-bit digest used for document
//! signing input and for selective-disclosure commitments.
//!
//! ## Security Invariant
//!
//! `ContentDigest` can only be computed from `CanonicalBytes`, ensuring that
//! every digest in the protocol is produced through the JCS pipeline. This
//! is enforced by the signature of [`sha256_digest()`].

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// A 32-byte SHA-256 digest of canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    ///
    /// Prefer [`sha256_digest()`] or [`digest_of()`]; this constructor exists
    /// for decoding digests that were transmitted elsewhere.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Render the digest as unpadded base64url, the form used inside
    /// documents (`paymentDetailsHash`, `claimsHash`).
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Canonicalize a value and digest it in one step.
pub fn digest_of(value: &impl Serialize) -> Result<ContentDigest, CanonicalizationError> {
    let canonical = CanonicalBytes::new(value)?;
    Ok(sha256_digest(&canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_sha256_digest_deterministic() {
        let mut data = BTreeMap::new();
        data.insert("a", 1);
        data.insert("b", 2);
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn test_known_sha256_vector() {
        // SHA-256("{}")
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_base64url_is_unpadded_and_url_safe() {
        let digest = digest_of(&serde_json::json!({"a": 1})).unwrap();
        let encoded = digest.to_base64url();
        assert_eq!(encoded.len(), 43);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_display_prefix() {
        let digest = digest_of(&serde_json::json!({"a": 1})).unwrap();
        let s = digest.to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn test_key_order_independent() {
        let a = digest_of(&serde_json::json!({"metadata": {"kind": "rfq", "from": "did:ex:a"}, "data": {}}));
        let b = digest_of(&serde_json::json!({"data": {}, "metadata": {"from": "did:ex:a", "kind": "rfq"}}));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_different_inputs_different_digests() {
        let a = digest_of(&serde_json::json!({"amount": "100"})).unwrap();
        let b = digest_of(&serde_json::json!({"amount": "101"})).unwrap();
        let c = digest_of(&serde_json::json!({"amount": "100", "extra": null})).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nesting_change_changes_digest() {
        let flat = digest_of(&serde_json::json!({"a": "x"})).unwrap();
        let nested = digest_of(&serde_json::json!({"a": ["x"]})).unwrap();
        assert_ne!(flat, nested);
    }
}
