//! # Signature Binding
//!
//! Binds a signature to exactly the `{metadata, data}` pair of a document.
//!
//! ## Security Invariant
//!
//! The signed digest is `SHA-256(JCS({"data": ..., "metadata": ...}))`.
//! `privateData` and `signature` are never part of it: private data is
//! authenticated indirectly through the salted commitments inside `data`,
//! and the signature cannot cover itself. Any change to `metadata` or
//! `data` after signing makes verification fail.
//!
//! The binder only proves *who* signed. Whether that signer is the
//! declared sender is checked by [`ensure_signer`].

use fxp_core::{digest_of, ContentDigest, Did};
use fxp_crypto::{DigestSigner, TokenVerifier};
use serde::Serialize;

use crate::error::MessageError;

#[derive(Serialize)]
struct SignedContent<'a, M: Serialize, D: Serialize> {
    metadata: &'a M,
    data: &'a D,
}

/// Digest of the signed portion of a document.
pub fn document_digest<M: Serialize, D: Serialize>(
    metadata: &M,
    data: &D,
) -> Result<ContentDigest, MessageError> {
    Ok(digest_of(&SignedContent { metadata, data })?)
}

/// Sign the `{metadata, data}` pair and return the signature token.
pub fn sign<M: Serialize, D: Serialize>(
    metadata: &M,
    data: &D,
    signer: &dyn DigestSigner,
) -> Result<String, MessageError> {
    let digest = document_digest(metadata, data)?;
    let token = signer.sign_digest(&digest).map_err(MessageError::Signing)?;
    tracing::debug!(signer = %signer.identity(), digest = %digest, "document signed");
    Ok(token)
}

/// Verify `signature` over the `{metadata, data}` pair and return the
/// identity that produced it.
///
/// A missing or empty signature fails with [`MessageError::EmptySignature`]
/// before any cryptography is attempted.
pub fn verify<M: Serialize, D: Serialize>(
    metadata: &M,
    data: &D,
    signature: Option<&str>,
    verifier: &dyn TokenVerifier,
) -> Result<Did, MessageError> {
    let token = match signature {
        Some(token) if !token.is_empty() => token,
        _ => return Err(MessageError::EmptySignature),
    };
    let digest = document_digest(metadata, data)?;
    verifier.verify_token(token, &digest).map_err(|e| {
        tracing::warn!(digest = %digest, error = %e, "signature rejected");
        MessageError::SignatureVerification(e)
    })
}

/// Fail unless the recovered signer is the declared sender.
pub fn ensure_signer(declared: &Did, recovered: &Did) -> Result<(), MessageError> {
    if declared == recovered {
        Ok(())
    } else {
        tracing::warn!(declared = %declared, recovered = %recovered, "signer is not the sender");
        Err(MessageError::SignerMismatch {
            declared: declared.to_string(),
            recovered: recovered.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxp_crypto::{JwsVerifier, LocalSigner};
    use serde_json::json;

    fn signer(seed: u8) -> LocalSigner {
        LocalSigner::from_seed(&[seed; 32]).unwrap()
    }

    #[test]
    fn test_sign_then_verify_recovers_signer() {
        let s = signer(1);
        let metadata = json!({"from": s.identity().as_str(), "kind": "close"});
        let data = json!({"reason": "done"});
        let token = sign(&metadata, &data, &s).unwrap();
        let who = verify(&metadata, &data, Some(&token), &JwsVerifier::new()).unwrap();
        assert_eq!(&who, s.identity());
    }

    #[test]
    fn test_digest_is_key_order_independent() {
        let a = json!({"from": "did:ex:a", "to": "did:ex:b"});
        let b = json!({"to": "did:ex:b", "from": "did:ex:a"});
        let data = json!({});
        assert_eq!(
            document_digest(&a, &data).unwrap(),
            document_digest(&b, &data).unwrap()
        );
    }

    #[test]
    fn test_digest_matches_envelope_vector() {
        let metadata = json!({"from": "did:ex:alice", "kind": "order"});
        let digest = document_digest(&metadata, &json!({})).unwrap();
        assert_eq!(
            digest.to_hex(),
            "1f9a6eab28d4ffbe4cffeae3824e0d68fc040808d0bcf328473972148cde837f"
        );
    }

    #[test]
    fn test_tampered_data_fails() {
        let s = signer(2);
        let metadata = json!({"from": s.identity().as_str()});
        let token = sign(&metadata, &json!({"reason": "a"}), &s).unwrap();
        let err = verify(&metadata, &json!({"reason": "b"}), Some(&token), &JwsVerifier::new())
            .unwrap_err();
        assert!(matches!(err, MessageError::SignatureVerification(_)));
    }

    #[test]
    fn test_missing_and_empty_signature() {
        let v = JwsVerifier::new();
        let md = json!({});
        assert!(matches!(
            verify(&md, &md, None, &v),
            Err(MessageError::EmptySignature)
        ));
        assert!(matches!(
            verify(&md, &md, Some(""), &v),
            Err(MessageError::EmptySignature)
        ));
    }

    #[test]
    fn test_ensure_signer() {
        let a = signer(3);
        let b = signer(4);
        assert!(ensure_signer(a.identity(), a.identity()).is_ok());
        assert!(matches!(
            ensure_signer(a.identity(), b.identity()),
            Err(MessageError::SignerMismatch { .. })
        ));
    }
}
