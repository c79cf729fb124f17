//! # Exchange Messages
//!
//! [`Message<D>`] is the envelope shared by every message kind: metadata,
//! kind-specific data, optional private data (RFQ only) and the detached
//! signature. The kind is fixed by the data type through
//! [`MessageData::KIND`], so a `Message<QuoteData>` can never carry
//! order data.
//!
//! Construction, signing and verification are explicit steps. A freshly
//! created message is unsigned; [`Message::sign`] attaches the token and
//! [`Message::verify`] authenticates it against `metadata.from`.

use std::fmt::Debug;

use fxp_core::{ContentDigest, Did, DocumentId, MessageKind};
use fxp_crypto::{DigestSigner, TokenVerifier};
use fxp_state::{registry, ExchangeMessage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::MessageError;
use crate::metadata::{ensure_id_kind, MessageMetadata, MessageOptions};
use crate::signature;

/// Data payload of one message kind.
pub trait MessageData:
    Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static
{
    /// The kind this payload belongs to.
    const KIND: MessageKind;

    /// Private data carried beside the payload. [`NoPrivateData`] for
    /// every kind except RFQ.
    type Private: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync;

    /// Check revealed private data against the commitments in `self`.
    fn check_private(
        &self,
        private: Option<&Self::Private>,
        require_private_data: bool,
    ) -> Result<(), MessageError> {
        let _ = (private, require_private_data);
        Ok(())
    }
}

/// Private data type of kinds that carry none. Uninhabited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoPrivateData {}

/// A protocol message of the kind fixed by `D`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "D: MessageData", deserialize = "D: MessageData")
)]
pub struct Message<D: MessageData> {
    /// Envelope metadata.
    pub metadata: MessageMetadata,
    /// Kind-specific payload.
    pub data: D,
    /// Private data, unsigned and verified through commitments in `data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_data: Option<D::Private>,
    /// Detached JWS over the `{metadata, data}` digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl<D: MessageData> Message<D> {
    /// Create an unsigned message from `from` to `to`.
    ///
    /// An RFQ opens its own exchange; every other kind needs
    /// `opts.exchange_id`.
    pub fn create(from: Did, to: Did, data: D, opts: MessageOptions) -> Result<Self, MessageError> {
        let metadata = opts.into_metadata(D::KIND, from, to)?;
        Ok(Self {
            metadata,
            data,
            private_data: None,
            signature: None,
        })
    }

    /// Create an unsigned reply within the exchange `previous` belongs to.
    ///
    /// Fails if `D::KIND` may not follow `previous`.
    pub fn reply_to<P: MessageData>(
        previous: &Message<P>,
        data: D,
        opts: MessageOptions,
    ) -> Result<Self, MessageError> {
        if !previous.is_valid_next(D::KIND) {
            return Err(MessageError::InvalidTransition {
                from: P::KIND,
                to: D::KIND,
            });
        }
        let opts = MessageOptions {
            exchange_id: Some(previous.metadata.exchange_id.clone()),
            protocol: opts
                .protocol
                .or_else(|| Some(previous.metadata.protocol.clone())),
            ..opts
        };
        Self::create(
            previous.metadata.to.clone(),
            previous.metadata.from.clone(),
            data,
            opts,
        )
    }

    /// The message kind.
    pub fn kind(&self) -> MessageKind {
        D::KIND
    }

    /// Digest of the signed `{metadata, data}` pair.
    pub fn digest(&self) -> Result<ContentDigest, MessageError> {
        signature::document_digest(&self.metadata, &self.data)
    }

    /// Sign the message, replacing any existing signature.
    ///
    /// The signer is not required to be `metadata.from`; a mismatch is
    /// reported by [`Message::verify`].
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

    /// Check revealed private data against the signed commitments.
    pub fn verify_private_data(&self, require_private_data: bool) -> Result<(), MessageError> {
        self.data
            .check_private(self.private_data.as_ref(), require_private_data)
    }

    /// Check the envelope rules serde cannot express: kind, id prefix and,
    /// for an RFQ, that it names its own exchange.
    pub fn check_envelope(&self) -> Result<(), MessageError> {
        if self.metadata.kind != D::KIND {
            return Err(MessageError::KindMismatch {
                expected: D::KIND.to_string(),
                found: self.metadata.kind.to_string(),
            });
        }
        ensure_id_kind(&self.metadata.id, D::KIND.as_str())?;
        if D::KIND == MessageKind::Rfq && self.metadata.exchange_id != self.metadata.id {
            return Err(MessageError::ExchangeIdMismatch {
                expected: self.metadata.id.to_string(),
                found: self.metadata.exchange_id.to_string(),
            });
        }
        Ok(())
    }

    /// Kinds that may follow this message.
    pub fn valid_next(&self) -> &'static [MessageKind] {
        registry::valid_next(D::KIND)
    }

    /// Whether `candidate` may follow this message.
    pub fn is_valid_next(&self, candidate: MessageKind) -> bool {
        registry::is_valid_next(D::KIND, candidate)
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(|e| MessageError::Malformed(e.to_string()))
    }
}

impl<D: MessageData> ExchangeMessage for Message<D> {
    fn kind(&self) -> MessageKind {
        D::KIND
    }

    fn id(&self) -> &DocumentId {
        &self.metadata.id
    }

    fn exchange_id(&self) -> &DocumentId {
        &self.metadata.exchange_id
    }

    fn protocol(&self) -> &str {
        &self.metadata.protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CloseData, OrderData, QuoteData};
    use fxp_crypto::{JwsVerifier, LocalSigner};

    fn signer(seed: u8) -> LocalSigner {
        LocalSigner::from_seed(&[seed; 32]).unwrap()
    }

    fn exchange_id() -> DocumentId {
        DocumentId::generate("rfq")
    }

    fn close(from: &Did, to: &Did) -> Message<CloseData> {
        Message::create(
            from.clone(),
            to.clone(),
            CloseData {
                reason: Some("no longer needed".into()),
                success: None,
            },
            MessageOptions::in_exchange(exchange_id()),
        )
        .unwrap()
    }

    #[test]
    fn test_create_is_unsigned() {
        let a = signer(1);
        let b = signer(2);
        let msg = close(a.identity(), b.identity());
        assert!(msg.signature.is_none());
        assert_eq!(msg.kind(), MessageKind::Close);
        assert!(matches!(
            msg.verify(&JwsVerifier::new()),
            Err(MessageError::EmptySignature)
        ));
    }

    #[test]
    fn test_sign_and_verify() {
        let a = signer(1);
        let b = signer(2);
        let mut msg = close(a.identity(), b.identity());
        msg.sign(&a).unwrap();
        assert_eq!(&msg.verify(&JwsVerifier::new()).unwrap(), a.identity());
    }

    #[test]
    fn test_signed_by_someone_else() {
        let k1 = signer(1);
        let k2 = signer(2);
        let mut msg = close(k2.identity(), k1.identity());
        msg.sign(&k1).unwrap();
        assert_eq!(
            &msg.verify_signature(&JwsVerifier::new()).unwrap(),
            k1.identity()
        );
        assert!(matches!(
            msg.verify(&JwsVerifier::new()),
            Err(MessageError::SignerMismatch { .. })
        ));
    }

    #[test]
    fn test_edit_after_signing_breaks_signature() {
        let a = signer(1);
        let b = signer(2);
        let mut msg = close(a.identity(), b.identity());
        msg.sign(&a).unwrap();
        msg.data.reason = Some("changed my mind".into());
        assert!(matches!(
            msg.verify(&JwsVerifier::new()),
            Err(MessageError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_signature_not_in_digest() {
        let a = signer(1);
        let b = signer(2);
        let mut msg = close(a.identity(), b.identity());
        let before = msg.digest().unwrap();
        msg.signature = Some("anything".into());
        assert_eq!(msg.digest().unwrap(), before);
    }

    #[test]
    fn test_reply_to_swaps_parties() {
        let a = signer(1);
        let b = signer(2);
        let msg = close(a.identity(), b.identity());
        // close is terminal
        assert!(Message::<OrderData>::reply_to(&msg, OrderData {}, MessageOptions::default())
            .is_err());

        let quote_data: QuoteData = serde_json::from_value(serde_json::json!({
            "expiresAt": "2026-01-15T12:00:00Z",
            "payoutUnitsPerPayinUnit": "16.7",
            "payin": {"currencyCode": "USD", "subtotal": "100", "total": "100"},
            "payout": {"currencyCode": "MXN", "subtotal": "1670", "total": "1670"}
        }))
        .unwrap();
        let quote = Message::create(
            b.identity().clone(),
            a.identity().clone(),
            quote_data,
            MessageOptions::in_exchange(msg.metadata.exchange_id.clone()),
        )
        .unwrap();
        let order = Message::reply_to(&quote, OrderData {}, MessageOptions::default()).unwrap();
        assert_eq!(&order.metadata.from, a.identity());
        assert_eq!(&order.metadata.to, b.identity());
        assert_eq!(order.metadata.exchange_id, quote.metadata.exchange_id);
    }

    #[test]
    fn test_check_envelope_kind() {
        let a = signer(1);
        let b = signer(2);
        let mut msg = close(a.identity(), b.identity());
        assert!(msg.check_envelope().is_ok());
        msg.metadata.kind = MessageKind::Cancel;
        assert!(matches!(
            msg.check_envelope(),
            Err(MessageError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_wire_shape() {
        let a = signer(1);
        let b = signer(2);
        let mut msg = close(a.identity(), b.identity());
        msg.sign(&a).unwrap();
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["metadata"]["kind"], "close");
        assert!(json.get("privateData").is_none());
        assert!(json["signature"].as_str().unwrap().contains(".."));
        assert_eq!(json["data"]["reason"], "no longer needed");
        assert!(json["data"].get("success").is_none());
    }
}
