//! # Document Kinds
//!
//! The closed sets of message and resource kinds. The serialized form is the
//! lowercase tag carried in `metadata.kind` and used as the id prefix.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kinds of exchange messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Request for quote. Opens an exchange.
    Rfq,
    /// Priced response to an RFQ.
    Quote,
    /// Customer acceptance of a quote.
    Order,
    /// Payment instructions issued by the PFI after an order.
    OrderInstructions,
    /// Settlement progress update.
    OrderStatus,
    /// Customer request to cancel.
    Cancel,
    /// Terminal message.
    Close,
}

impl MessageKind {
    /// All message kinds, in exchange order.
    pub const ALL: [MessageKind; 7] = [
        Self::Rfq,
        Self::Quote,
        Self::Order,
        Self::OrderInstructions,
        Self::OrderStatus,
        Self::Cancel,
        Self::Close,
    ];

    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rfq => "rfq",
            Self::Quote => "quote",
            Self::Order => "order",
            Self::OrderInstructions => "orderinstructions",
            Self::OrderStatus => "orderstatus",
            Self::Cancel => "cancel",
            Self::Close => "close",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

/// Kinds of PFI-published resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Currency pair terms offered by a PFI.
    Offering,
    /// Customer balance held at a PFI.
    Balance,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [ResourceKind; 2] = [Self::Offering, Self::Balance];

    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offering => "offering",
            Self::Balance => "balance",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}
