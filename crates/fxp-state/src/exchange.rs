//! # Exchange History
//!
//! Runtime-checked accumulation of the messages of one exchange.
//!
//! The transition table answers a single-step question; an [`Exchange`]
//! applies it across the whole history and adds the exchange-level rules:
//!
//! - the first message is an RFQ, and its id becomes the exchange id;
//! - every later message carries that exchange id;
//! - every later message uses the RFQ's protocol version;
//! - every later message kind is in the valid-next set of the latest one.
//!
//! A rejected message leaves the exchange unchanged.

use fxp_core::{DocumentId, MessageKind};
use thiserror::Error;

use crate::registry;

/// What an [`Exchange`] needs to know about a message.
pub trait ExchangeMessage {
    /// The message kind.
    fn kind(&self) -> MessageKind;
    /// The message id.
    fn id(&self) -> &DocumentId;
    /// The exchange the message claims to belong to.
    fn exchange_id(&self) -> &DocumentId;
    /// The protocol version the message was written for.
    fn protocol(&self) -> &str;
}

/// Error adding a message to an exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// An exchange must open with an RFQ.
    #[error("exchange must start with rfq, got {0}")]
    NotOpenedByRfq(MessageKind),

    /// The message belongs to another exchange.
    #[error("message {id} has exchangeId {found}, expected {expected}")]
    ExchangeIdMismatch {
        /// The offending message id.
        id: String,
        /// The exchange this history tracks.
        expected: String,
        /// The exchange id the message carries.
        found: String,
    },

    /// The message uses a different protocol version than the RFQ.
    #[error("message {id} uses protocol {found}, exchange uses {expected}")]
    ProtocolMismatch {
        /// The offending message id.
        id: String,
        /// Protocol of the opening RFQ.
        expected: String,
        /// Protocol of the message.
        found: String,
    },

    /// The kind may not follow the latest message.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Kind of the latest message.
        from: MessageKind,
        /// Kind of the rejected message.
        to: MessageKind,
    },
}

/// The ordered messages of one exchange.
#[derive(Debug, Clone)]
pub struct Exchange<M> {
    messages: Vec<M>,
}

impl<M> Default for Exchange<M> {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
        }
    }
}

impl<M: ExchangeMessage> Exchange<M> {
    /// An empty exchange.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an exchange from a message sequence, checking every step.
    pub fn from_messages(messages: impl IntoIterator<Item = M>) -> Result<Self, ExchangeError> {
        let mut exchange = Self::new();
        for msg in messages {
            exchange.add_next(msg)?;
        }
        Ok(exchange)
    }

    /// Append `msg` if it is a legal next message.
    pub fn add_next(&mut self, msg: M) -> Result<(), ExchangeError> {
        let Some(first) = self.messages.first() else {
            if msg.kind() != MessageKind::Rfq {
                return Err(ExchangeError::NotOpenedByRfq(msg.kind()));
            }
            if msg.exchange_id() != msg.id() {
                return Err(ExchangeError::ExchangeIdMismatch {
                    id: msg.id().to_string(),
                    expected: msg.id().to_string(),
                    found: msg.exchange_id().to_string(),
                });
            }
            tracing::debug!(exchange_id = %msg.id(), "exchange opened");
            self.messages.push(msg);
            return Ok(());
        };

        if msg.exchange_id() != first.id() {
            return Err(ExchangeError::ExchangeIdMismatch {
                id: msg.id().to_string(),
                expected: first.id().to_string(),
                found: msg.exchange_id().to_string(),
            });
        }
        if msg.protocol() != first.protocol() {
            return Err(ExchangeError::ProtocolMismatch {
                id: msg.id().to_string(),
                expected: first.protocol().to_string(),
                found: msg.protocol().to_string(),
            });
        }
        let latest = self.latest_kind().unwrap_or(MessageKind::Rfq);
        if !registry::is_valid_next(latest, msg.kind()) {
            return Err(ExchangeError::InvalidTransition {
                from: latest,
                to: msg.kind(),
            });
        }

        tracing::debug!(exchange_id = %first.id(), from = %latest, to = %msg.kind(), "exchange advanced");
        self.messages.push(msg);
        Ok(())
    }

    /// The exchange id, once the RFQ has been added.
    pub fn exchange_id(&self) -> Option<&DocumentId> {
        self.messages.first().map(|m| m.id())
    }

    /// Kind of the most recent message.
    pub fn latest_kind(&self) -> Option<MessageKind> {
        self.messages.last().map(|m| m.kind())
    }

    /// Kinds that may be added next. Only `rfq` for an empty exchange.
    pub fn valid_next(&self) -> &'static [MessageKind] {
        match self.latest_kind() {
            Some(kind) => registry::valid_next(kind),
            None => &[MessageKind::Rfq],
        }
    }

    /// Whether the latest message is terminal.
    pub fn is_closed(&self) -> bool {
        self.latest_kind()
            .map(|k| registry::entry(k).is_terminal())
            .unwrap_or(false)
    }

    /// The messages in arrival order.
    pub fn messages(&self) -> &[M] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been added.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
