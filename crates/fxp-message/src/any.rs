//! # Kind-Erased Documents
//!
//! [`AnyMessage`] and [`AnyResource`] hold a decoded document whose kind
//! was only known at runtime. Each variant wraps the typed document, so
//! callers `match` once and then work with concrete data.

use fxp_core::{ContentDigest, Did, DocumentId, MessageKind, ResourceKind};
use fxp_crypto::{DigestSigner, TokenVerifier};
use fxp_state::ExchangeMessage;
use serde::Serialize;

use crate::balance::Balance;
use crate::error::MessageError;
use crate::metadata::{MessageMetadata, ResourceMetadata};
use crate::offering::Offering;
use crate::order::{Cancel, Close, Order, OrderInstructions, OrderStatus};
use crate::quote::Quote;
use crate::rfq::Rfq;

/// A message of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyMessage {
    Rfq(Rfq),
    Quote(Quote),
    Order(Order),
    OrderInstructions(OrderInstructions),
    OrderStatus(OrderStatus),
    Cancel(Cancel),
    Close(Close),
}

macro_rules! each_message {
    ($value:expr, $m:ident => $body:expr) => {
        match $value {
            AnyMessage::Rfq($m) => $body,
            AnyMessage::Quote($m) => $body,
            AnyMessage::Order($m) => $body,
            AnyMessage::OrderInstructions($m) => $body,
            AnyMessage::OrderStatus($m) => $body,
            AnyMessage::Cancel($m) => $body,
            AnyMessage::Close($m) => $body,
        }
    };
}

impl AnyMessage {
    /// Envelope metadata.
    pub fn metadata(&self) -> &MessageMetadata {
        each_message!(self, m => &m.metadata)
    }

    /// The message kind.
    pub fn kind(&self) -> MessageKind {
        each_message!(self, m => m.kind())
    }

    /// The signature token, if any.
    pub fn signature(&self) -> Option<&str> {
        each_message!(self, m => m.signature.as_deref())
    }

    /// Digest of the signed `{metadata, data}` pair.
    pub fn digest(&self) -> Result<ContentDigest, MessageError> {
        each_message!(self, m => m.digest())
    }

    /// Sign the message, replacing any existing signature.
    pub fn sign(&mut self, signer: &dyn DigestSigner) -> Result<(), MessageError> {
        each_message!(self, m => m.sign(signer))
    }

    /// Verify the signature and require the signer to be `metadata.from`.
    pub fn verify(&self, verifier: &dyn TokenVerifier) -> Result<Did, MessageError> {
        each_message!(self, m => m.verify(verifier))
    }

    /// Check revealed private data against the signed commitments.
    pub fn verify_private_data(&self, require_private_data: bool) -> Result<(), MessageError> {
        each_message!(self, m => m.verify_private_data(require_private_data))
    }

    /// Kinds that may follow this message.
    pub fn valid_next(&self) -> &'static [MessageKind] {
        each_message!(self, m => m.valid_next())
    }

    /// Whether `candidate` may follow this message.
    pub fn is_valid_next(&self, candidate: MessageKind) -> bool {
        each_message!(self, m => m.is_valid_next(candidate))
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, MessageError> {
        each_message!(self, m => m.to_json())
    }

    /// The RFQ, if this is one.
    pub fn as_rfq(&self) -> Option<&Rfq> {
        match self {
            AnyMessage::Rfq(m) => Some(m),
            _ => None,
        }
    }
}

impl ExchangeMessage for AnyMessage {
    fn kind(&self) -> MessageKind {
        AnyMessage::kind(self)
    }

    fn id(&self) -> &DocumentId {
        &self.metadata().id
    }

    fn exchange_id(&self) -> &DocumentId {
        &self.metadata().exchange_id
    }

    fn protocol(&self) -> &str {
        &self.metadata().protocol
    }
}

macro_rules! impl_from_message {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for AnyMessage {
                fn from(m: $variant) -> Self {
                    AnyMessage::$variant(m)
                }
            }
        )+
    };
}

impl_from_message!(Rfq, Quote, Order, OrderInstructions, OrderStatus, Cancel, Close);

/// A resource of any kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyResource {
    Offering(Offering),
    Balance(Balance),
}

impl AnyResource {
    /// Envelope metadata.
    pub fn metadata(&self) -> &ResourceMetadata {
        match self {
            AnyResource::Offering(r) => &r.metadata,
            AnyResource::Balance(r) => &r.metadata,
        }
    }

    /// The resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.metadata().kind
    }

    /// Digest of the signed `{metadata, data}` pair.
    pub fn digest(&self) -> Result<ContentDigest, MessageError> {
        match self {
            AnyResource::Offering(r) => r.digest(),
            AnyResource::Balance(r) => r.digest(),
        }
    }

    /// Sign the resource, replacing any existing signature.
    pub fn sign(&mut self, signer: &dyn DigestSigner) -> Result<(), MessageError> {
        match self {
            AnyResource::Offering(r) => r.sign(signer),
            AnyResource::Balance(r) => r.sign(signer),
        }
    }

    /// Verify the signature and require the signer to be `metadata.from`.
    pub fn verify(&self, verifier: &dyn TokenVerifier) -> Result<Did, MessageError> {
        match self {
            AnyResource::Offering(r) => r.verify(verifier),
            AnyResource::Balance(r) => r.verify(verifier),
        }
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> Result<String, MessageError> {
        match self {
            AnyResource::Offering(r) => r.to_json(),
            AnyResource::Balance(r) => r.to_json(),
        }
    }
}

impl From<Offering> for AnyResource {
    fn from(r: Offering) -> Self {
        AnyResource::Offering(r)
    }
}

impl From<Balance> for AnyResource {
    fn from(r: Balance) -> Self {
        AnyResource::Balance(r)
    }
}
