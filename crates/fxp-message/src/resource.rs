//! # Resources
//!
//! PFI-published documents outside any exchange: offerings and balances.
//! A resource has no recipient, no exchange id and no private data, and is
//! signed exactly like a message.

use std::fmt::Debug;

use fxp_core::{ContentDigest, Did, ResourceKind};
use fxp_crypto::{DigestSigner, TokenVerifier};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::metadata::{ensure_id_kind, ResourceMetadata, ResourceOptions};
use crate::signature;

/// Data payload of one resource kind.
pub trait ResourceData:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// The kind this payload belongs to.
    const KIND: ResourceKind;
}

/// A resource of the kind fixed by `D`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "D: ResourceData", deserialize = "D: ResourceData"))]
pub struct Resource<D: ResourceData> {
    /// Envelope metadata.
    pub metadata: ResourceMetadata,
    /// Kind-specific payload.
    pub data: D,
    /// Detached JWS over the `{metadata, data}` digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl<D: ResourceData> Resource<D> {
    /// Create an unsigned resource published by `from`.
    pub fn create(from: Did, data: D, opts: ResourceOptions) -> Result<Self, MessageError> {
        Ok(Self {
            metadata: opts.into_metadata(D::KIND, from)?,
            data,
            signature: None,
        })
    }

    /// The resource kind.
    pub fn kind(&self) -> ResourceKind {
        D::KIND
    }

    /// Digest of the signed `{metadata, data}` pair.
    pub fn digest(&self) -> Result<ContentDigest, MessageError> {
        signature::document_digest(&self.metadata, &self.data)
    }

    /// Sign the resource, replacing any existing signature.
    pub fn sign(&mut self, signer: &dyn DigestSigner) -> Result<(), MessageError> {
        self.signature = Some(signature::sign(&self.metadata, &self.data, signer)?);
        Ok(())
    }

    /// Verify the signature and return the signer, without comparing it
    /// to `metadata.from`.
    pub fn verify_signature(&self, verifier: &dyn TokenVerifier) -> Result<Did, MessageError> {
        signature::verify(
            &self.metadata,
            &self.data,
            self.signature.as_deref(),
            verifier,
        )
    }

    /// Verify the signature and require the signer to be `metadata.from`.
    pub fn verify(&self, verifier: &dyn TokenVerifier) -> Result<Did, MessageError> {
        let signer = self.verify_signature(verifier)?;
        signature::ensure_signer(&self.metadata.from, &signer)?;
        Ok(signer)
    }

    /// Check the kind and id prefix.
    pub fn check_envelope(&self) -> Result<(), MessageError> {
        if self.metadata.kind != D::KIND {
            return Err(MessageError::KindMismatch {
                expected: D::KIND.to_string(),
                found: self.metadata.kind.to_string(),
            });
        }
        ensure_id_kind(&self.metadata.id, D::KIND.as_str())
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(|e| MessageError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BalanceData;
    use fxp_crypto::{JwsVerifier, LocalSigner};

    fn balance(pfi: &LocalSigner) -> Resource<BalanceData> {
        Resource::create(
            pfi.identity().clone(),
            BalanceData {
                currency_code: "USD".into(),
                available: "400.00".into(),
            },
            ResourceOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let pfi = LocalSigner::from_seed(&[9; 32]).unwrap();
        let mut res = balance(&pfi);
        res.sign(&pfi).unwrap();
        assert_eq!(&res.verify(&JwsVerifier::new()).unwrap(), pfi.identity());
    }

    #[test]
    fn test_tampered_balance() {
        let pfi = LocalSigner::from_seed(&[9; 32]).unwrap();
        let mut res = balance(&pfi);
        res.sign(&pfi).unwrap();
        res.data.available = "4000.00".into();
        assert!(matches!(
            res.verify(&JwsVerifier::new()),
            Err(MessageError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_unsigned() {
        let pfi = LocalSigner::from_seed(&[9; 32]).unwrap();
        assert!(matches!(
            balance(&pfi).verify(&JwsVerifier::new()),
            Err(MessageError::EmptySignature)
        ));
    }

    #[test]
    fn test_envelope() {
        let pfi = LocalSigner::from_seed(&[9; 32]).unwrap();
        let res = balance(&pfi);
        assert_eq!(res.kind(), ResourceKind::Balance);
        assert!(res.check_envelope().is_ok());
        let json: serde_json::Value = serde_json::from_str(&res.to_json().unwrap()).unwrap();
        assert_eq!(json["metadata"]["kind"], "balance");
        assert!(json.get("signature").is_none());
    }
}
