//! # Dispatcher
//!
//! Turns untrusted bytes into typed, authenticated documents.
//!
//! ## Pipeline
//!
//! 1. Parse JSON and read `metadata.kind`, before any typed decode.
//! 2. Reject unknown kinds.
//! 3. Validate the envelope schema, then the kind's data schema, then the
//!    RFQ private-data schema when private data is present.
//! 4. Decode into the typed document and check the envelope rules serde
//!    cannot express (id prefix, RFQ exchange id).
//! 5. *Parse only:* verify the signature against `metadata.from`, then
//!    check revealed private data against its commitments.
//!
//! `decode_*` stops after step 4. `parse_*` runs every step; the
//! signature step can be turned off through [`ParseOptions`].
//!
//! ## Security Invariant
//!
//! Schema validation runs on the raw value before typed decoding, so a
//! payload that does not conform is never materialized as a domain type.
//! A document returned by `parse_*` with default options was signed by
//! its declared sender over exactly the content returned.

use std::str::FromStr;

use fxp_core::{MessageKind, ResourceKind};
use fxp_crypto::TokenVerifier;
use fxp_schema::SchemaCheck;
use fxp_state::registry;
use metrics::counter;
use serde_json::Value;

use crate::any::{AnyMessage, AnyResource};
use crate::balance::BalanceData;
use crate::error::MessageError;
use crate::message::{Message, MessageData};
use crate::offering::OfferingData;
use crate::order::{CancelData, CloseData, OrderData, OrderInstructionsData, OrderStatusData};
use crate::quote::QuoteData;
use crate::resource::{Resource, ResourceData};
use crate::rfq::RfqData;

/// Options for `parse_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Verify the signature and that the signer is `metadata.from`.
    pub verify_signature: bool,
    /// Require private data for every commitment an RFQ carries.
    pub require_private_data: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            verify_signature: true,
            require_private_data: false,
        }
    }
}

/// Decodes and authenticates documents against a schema set and a
/// signature verifier.
///
/// Holds only shared references, so one dispatcher can serve any number
/// of threads.
#[derive(Clone, Copy)]
pub struct Dispatcher<'a> {
    schemas: &'a dyn SchemaCheck,
    verifier: &'a dyn TokenVerifier,
}

impl std::fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<'a> Dispatcher<'a> {
    /// A dispatcher validating with `schemas` and verifying with `verifier`.
    pub fn new(schemas: &'a dyn SchemaCheck, verifier: &'a dyn TokenVerifier) -> Self {
        Self { schemas, verifier }
    }

    // ─── Messages ────────────────────────────────────────────────────

    /// Decode a message of any kind without authenticating it.
    pub fn decode_message(&self, bytes: &[u8]) -> Result<AnyMessage, MessageError> {
        let value = parse_json(bytes)?;
        let kind = read_kind(&value)?;
        let kind = MessageKind::from_str(&kind)
            .map_err(|_| reject(MessageError::UnknownKind(kind), "unknown"))?;
        let msg = self
            .decode_message_value(kind, value)
            .map_err(|e| reject(e, kind.as_str()))?;
        decoded(kind.as_str());
        Ok(msg)
    }

    /// Decode and authenticate a message of any kind.
    pub fn parse_message(
        &self,
        bytes: &[u8],
        opts: &ParseOptions,
    ) -> Result<AnyMessage, MessageError> {
        let value = parse_json(bytes)?;
        let kind = read_kind(&value)?;
        let kind = MessageKind::from_str(&kind)
            .map_err(|_| reject(MessageError::UnknownKind(kind), "unknown"))?;
        let msg = self
            .decode_message_value(kind, value)
            .and_then(|msg| {
                self.authenticate_message(&msg, opts)?;
                Ok(msg)
            })
            .map_err(|e| reject(e, kind.as_str()))?;
        decoded(kind.as_str());
        Ok(msg)
    }

    /// Decode and authenticate a message that must be of kind `D::KIND`.
    pub fn parse_message_as<D: MessageData>(
        &self,
        bytes: &[u8],
        opts: &ParseOptions,
    ) -> Result<Message<D>, MessageError> {
        let value = parse_json(bytes)?;
        let found = read_kind(&value)?;
        let kind = MessageKind::from_str(&found)
            .map_err(|_| reject(MessageError::UnknownKind(found.clone()), "unknown"))?;
        if kind != D::KIND {
            return Err(reject(
                MessageError::KindMismatch {
                    expected: D::KIND.to_string(),
                    found,
                },
                D::KIND.as_str(),
            ));
        }
        let msg = self
            .decode_typed_message::<D>(value)
            .and_then(|msg| {
                if opts.verify_signature {
                    msg.verify(self.verifier)?;
                }
                msg.verify_private_data(opts.require_private_data)?;
                Ok(msg)
            })
            .map_err(|e| reject(e, D::KIND.as_str()))?;
        decoded(D::KIND.as_str());
        Ok(msg)
    }

    fn decode_message_value(
        &self,
        kind: MessageKind,
        value: Value,
    ) -> Result<AnyMessage, MessageError> {
        Ok(match kind {
            MessageKind::Rfq => AnyMessage::Rfq(self.decode_typed_message::<RfqData>(value)?),
            MessageKind::Quote => AnyMessage::Quote(self.decode_typed_message::<QuoteData>(value)?),
            MessageKind::Order => AnyMessage::Order(self.decode_typed_message::<OrderData>(value)?),
            MessageKind::OrderInstructions => AnyMessage::OrderInstructions(
                self.decode_typed_message::<OrderInstructionsData>(value)?,
            ),
            MessageKind::OrderStatus => {
                AnyMessage::OrderStatus(self.decode_typed_message::<OrderStatusData>(value)?)
            }
            MessageKind::Cancel => {
                AnyMessage::Cancel(self.decode_typed_message::<CancelData>(value)?)
            }
            MessageKind::Close => AnyMessage::Close(self.decode_typed_message::<CloseData>(value)?),
        })
    }

    fn decode_typed_message<D: MessageData>(&self, value: Value) -> Result<Message<D>, MessageError> {
        let entry = registry::entry(D::KIND);
        self.schemas
            .check(registry::MESSAGE_ENVELOPE_SCHEMA, &value)?;
        self.schemas.check(entry.schema_name, &value["data"])?;
        if let Some(private) = value.get("privateData") {
            if D::KIND != MessageKind::Rfq {
                return Err(MessageError::Malformed(format!(
                    "{} messages carry no privateData",
                    D::KIND
                )));
            }
            self.schemas.check(registry::RFQ_PRIVATE_SCHEMA, private)?;
        }

        let msg: Message<D> =
            serde_json::from_value(value).map_err(|e| MessageError::Malformed(e.to_string()))?;
        msg.check_envelope()?;
        tracing::debug!(kind = %D::KIND, id = %msg.metadata.id, "message decoded");
        Ok(msg)
    }

    fn authenticate_message(
        &self,
        msg: &AnyMessage,
        opts: &ParseOptions,
    ) -> Result<(), MessageError> {
        if opts.verify_signature {
            msg.verify(self.verifier)?;
        }
        msg.verify_private_data(opts.require_private_data)
    }

    // ─── Resources ───────────────────────────────────────────────────

    /// Decode a resource of any kind without authenticating it.
    pub fn decode_resource(&self, bytes: &[u8]) -> Result<AnyResource, MessageError> {
        let value = parse_json(bytes)?;
        let kind = read_kind(&value)?;
        let kind = ResourceKind::from_str(&kind)
            .map_err(|_| reject(MessageError::UnknownKind(kind), "unknown"))?;
        let res = self
            .decode_resource_value(kind, value)
            .map_err(|e| reject(e, kind.as_str()))?;
        decoded(kind.as_str());
        Ok(res)
    }

    /// Decode and authenticate a resource of any kind.
    pub fn parse_resource(
        &self,
        bytes: &[u8],
        opts: &ParseOptions,
    ) -> Result<AnyResource, MessageError> {
        let value = parse_json(bytes)?;
        let kind = read_kind(&value)?;
        let kind = ResourceKind::from_str(&kind)
            .map_err(|_| reject(MessageError::UnknownKind(kind), "unknown"))?;
        let res = self
            .decode_resource_value(kind, value)
            .and_then(|res| {
                if opts.verify_signature {
                    res.verify(self.verifier)?;
                }
                Ok(res)
            })
            .map_err(|e| reject(e, kind.as_str()))?;
        decoded(kind.as_str());
        Ok(res)
    }

    /// Decode and authenticate a resource that must be of kind `D::KIND`.
    pub fn parse_resource_as<D: ResourceData>(
        &self,
        bytes: &[u8],
        opts: &ParseOptions,
    ) -> Result<Resource<D>, MessageError> {
        let value = parse_json(bytes)?;
        let found = read_kind(&value)?;
        let kind = ResourceKind::from_str(&found)
            .map_err(|_| reject(MessageError::UnknownKind(found.clone()), "unknown"))?;
        if kind != D::KIND {
            return Err(reject(
                MessageError::KindMismatch {
                    expected: D::KIND.to_string(),
                    found,
                },
                D::KIND.as_str(),
            ));
        }
        let res = self
            .decode_typed_resource::<D>(value)
            .and_then(|res| {
                if opts.verify_signature {
                    res.verify(self.verifier)?;
                }
                Ok(res)
            })
            .map_err(|e| reject(e, D::KIND.as_str()))?;
        decoded(D::KIND.as_str());
        Ok(res)
    }

    fn decode_resource_value(
        &self,
        kind: ResourceKind,
        value: Value,
    ) -> Result<AnyResource, MessageError> {
        Ok(match kind {
            ResourceKind::Offering => {
                AnyResource::Offering(self.decode_typed_resource::<OfferingData>(value)?)
            }
            ResourceKind::Balance => {
                AnyResource::Balance(self.decode_typed_resource::<BalanceData>(value)?)
            }
        })
    }

    fn decode_typed_resource<D: ResourceData>(
        &self,
        value: Value,
    ) -> Result<Resource<D>, MessageError> {
        self.schemas
            .check(registry::RESOURCE_ENVELOPE_SCHEMA, &value)?;
        self.schemas
            .check(registry::resource_schema_name(D::KIND), &value["data"])?;
        let res: Resource<D> =
            serde_json::from_value(value).map_err(|e| MessageError::Malformed(e.to_string()))?;
        res.check_envelope()?;
        tracing::debug!(kind = %D::KIND, id = %res.metadata.id, "resource decoded");
        Ok(res)
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, MessageError> {
    serde_json::from_slice(bytes)
        .map_err(|e| reject(MessageError::Malformed(format!("invalid JSON: {e}")), "unknown"))
}

/// `metadata.kind` as a string, before anything else is looked at.
fn read_kind(value: &Value) -> Result<String, MessageError> {
    value
        .get("metadata")
        .and_then(|m| m.get("kind"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            reject(
                MessageError::Malformed("metadata.kind is missing or not a string".into()),
                "unknown",
            )
        })
}

fn decoded(kind: &'static str) {
    counter!("fxp_documents_decoded_total", "kind" => kind).increment(1);
}

fn reject(err: MessageError, kind: &'static str) -> MessageError {
    tracing::warn!(kind, reason = err.reason(), error = %err, "document rejected");
    counter!("fxp_documents_rejected_total", "kind" => kind, "reason" => err.reason())
        .increment(1);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CloseData, MessageOptions};
    use fxp_core::{Did, DocumentId};
    use fxp_crypto::{DigestSigner, JwsVerifier, LocalSigner};
    use fxp_schema::SchemaRegistry;

    fn close(signer: &LocalSigner) -> Message<CloseData> {
        let mut msg = Message::create(
            signer.identity().clone(),
            Did::new("did:ex:pfi").unwrap(),
            CloseData {
                reason: Some("done".into()),
                success: Some(true),
            },
            MessageOptions::in_exchange(DocumentId::generate("rfq")),
        )
        .unwrap();
        msg.sign(signer).unwrap();
        msg
    }

    #[test]
    fn test_parse_close() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        let signer = LocalSigner::from_seed(&[5; 32]).unwrap();
        let msg = close(&signer);
        let json = msg.to_json().unwrap();

        let parsed = dispatcher
            .parse_message(json.as_bytes(), &ParseOptions::default())
            .unwrap();
        assert_eq!(parsed, AnyMessage::Close(msg.clone()));

        let typed = dispatcher
            .parse_message_as::<CloseData>(json.as_bytes(), &ParseOptions::default())
            .unwrap();
        assert_eq!(typed, msg);
    }

    #[test]
    fn test_parse_as_wrong_kind() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        let signer = LocalSigner::from_seed(&[5; 32]).unwrap();
        let json = close(&signer).to_json().unwrap();
        assert!(matches!(
            dispatcher.parse_message_as::<CancelData>(json.as_bytes(), &ParseOptions::default()),
            Err(MessageError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_as_unknown_kind() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        let signer = LocalSigner::from_seed(&[5; 32]).unwrap();
        let mut value = serde_json::to_value(close(&signer)).unwrap();
        value["metadata"]["kind"] = serde_json::json!("hoarder");
        let bytes = serde_json::to_vec(&value).unwrap();
        match dispatcher.parse_message_as::<CloseData>(&bytes, &ParseOptions::default()) {
            Err(MessageError::UnknownKind(kind)) => assert_eq!(kind, "hoarder"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
        match dispatcher.parse_resource_as::<BalanceData>(&bytes, &ParseOptions::default()) {
            Err(MessageError::UnknownKind(kind)) => assert_eq!(kind, "hoarder"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_as_other_known_resource_kind() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        let signer = LocalSigner::from_seed(&[5; 32]).unwrap();
        let mut value = serde_json::to_value(close(&signer)).unwrap();
        value["metadata"]["kind"] = serde_json::json!("offering");
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            dispatcher.parse_resource_as::<BalanceData>(&bytes, &ParseOptions::default()),
            Err(MessageError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_not_json() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        assert!(matches!(
            dispatcher.decode_message(b"not json"),
            Err(MessageError::Malformed(_))
        ));
        assert!(matches!(
            dispatcher.decode_message(br#"{"metadata": {}}"#),
            Err(MessageError::Malformed(_))
        ));
    }

    #[test]
    fn test_resource_kind_is_not_a_message() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        assert!(matches!(
            dispatcher.decode_message(br#"{"metadata": {"kind": "offering"}, "data": {}}"#),
            Err(MessageError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_private_data_only_on_rfq() {
        let schemas = SchemaRegistry::embedded().unwrap();
        let verifier = JwsVerifier::new();
        let dispatcher = Dispatcher::new(&schemas, &verifier);
        let signer = LocalSigner::from_seed(&[5; 32]).unwrap();
        let mut value = serde_json::to_value(close(&signer)).unwrap();
        value["privateData"] = serde_json::json!({"salt": "c2FsdA"});
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            dispatcher.decode_message(&bytes),
            Err(MessageError::Malformed(_))
        ));
    }

    #[test]
    fn test_default_options() {
        let opts = ParseOptions::default();
        assert!(opts.verify_signature);
        assert!(!opts.require_private_data);
    }
}
