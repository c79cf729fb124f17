//! # Document Metadata
//!
//! The envelope fields every document carries, and the explicit option
//! structs used to construct them.
//!
//! Field declaration order follows the wire layout for readability only;
//! digests are computed over the canonical form, where keys are sorted.

use fxp_core::{Did, DocumentId, MessageKind, ResourceKind, Timestamp, DEFAULT_PROTOCOL};
use serde::{Deserialize, Serialize};

use crate::error::MessageError;

/// Metadata of an exchange message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Sender identity.
    pub from: Did,
    /// Recipient identity.
    pub to: Did,
    /// Message kind.
    pub kind: MessageKind,
    /// Message id, prefixed with the kind.
    pub id: DocumentId,
    /// Id of the RFQ that opened the exchange.
    pub exchange_id: DocumentId,
    /// Caller-assigned correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Protocol version.
    pub protocol: String,
}

/// Metadata of a PFI-published resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Publisher identity.
    pub from: Did,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource id, prefixed with the kind.
    pub id: DocumentId,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    /// Protocol version.
    pub protocol: String,
}

/// Optional settings for constructing a message.
///
/// Unset fields default to a freshly generated id, the current time and
/// protocol `1.0`. Every message except an RFQ must set `exchange_id`.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    /// Explicit id. Must carry the message kind's prefix.
    pub id: Option<DocumentId>,
    /// Explicit creation time.
    pub created_at: Option<Timestamp>,
    /// Protocol version.
    pub protocol: Option<String>,
    /// Exchange this message belongs to. An RFQ opens its own exchange.
    pub exchange_id: Option<DocumentId>,
    /// Correlation id.
    pub external_id: Option<String>,
}

impl MessageOptions {
    /// Options for a reply within an existing exchange.
    pub fn in_exchange(exchange_id: DocumentId) -> Self {
        Self {
            exchange_id: Some(exchange_id),
            ..Self::default()
        }
    }

    /// Validate the options for `kind` and build the metadata.
    pub(crate) fn into_metadata(
        self,
        kind: MessageKind,
        from: Did,
        to: Did,
    ) -> Result<MessageMetadata, MessageError> {
        let id = resolve_id(self.id, kind.as_str())?;
        let exchange_id = match (kind, self.exchange_id) {
            (MessageKind::Rfq, None) => id.clone(),
            (MessageKind::Rfq, Some(given)) if given == id => given,
            (MessageKind::Rfq, Some(given)) => {
                return Err(MessageError::ExchangeIdMismatch {
                    expected: id.to_string(),
                    found: given.to_string(),
                })
            }
            (_, Some(given)) => given,
            (_, None) => return Err(MessageError::MissingExchangeId(kind.to_string())),
        };
        Ok(MessageMetadata {
            from,
            to,
            kind,
            id,
            exchange_id,
            external_id: self.external_id,
            created_at: self.created_at.unwrap_or_else(Timestamp::now),
            protocol: self.protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
        })
    }
}

/// Optional settings for constructing a resource.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    /// Explicit id. Must carry the resource kind's prefix.
    pub id: Option<DocumentId>,
    /// Explicit creation time.
    pub created_at: Option<Timestamp>,
    /// Last update time.
    pub updated_at: Option<Timestamp>,
    /// Protocol version.
    pub protocol: Option<String>,
}

impl ResourceOptions {
    pub(crate) fn into_metadata(
        self,
        kind: ResourceKind,
        from: Did,
    ) -> Result<ResourceMetadata, MessageError> {
        Ok(ResourceMetadata {
            from,
            kind,
            id: resolve_id(self.id, kind.as_str())?,
            created_at: self.created_at.unwrap_or_else(Timestamp::now),
            updated_at: self.updated_at,
            protocol: self.protocol.unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
        })
    }
}

fn resolve_id(id: Option<DocumentId>, kind: &str) -> Result<DocumentId, MessageError> {
    match id {
        None => Ok(DocumentId::generate(kind)),
        Some(id) => ensure_id_kind(&id, kind).map(|()| id),
    }
}

/// Fail unless `id` carries the `kind` prefix.
pub(crate) fn ensure_id_kind(id: &DocumentId, kind: &str) -> Result<(), MessageError> {
    if id.has_kind(kind) {
        Ok(())
    } else {
        Err(MessageError::InvalidId {
            id: id.to_string(),
            kind: kind.to_string(),
        })
    }
}
