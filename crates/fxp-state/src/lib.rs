//! # fxp-state — Kind Registry and Exchange State
//!
//! The state machine governing which message kind may follow another
//! within one exchange.
//!
//! - **Registry** (`registry.rs`): a static table from message kind to its
//!   data schema and valid-next set, with the pure single-step lookup
//!   [`is_valid_next`].
//!
//! - **Exchange** (`exchange.rs`): an ordered history of one exchange's
//!   messages with runtime-checked appends. Generic over any message type
//!   implementing [`ExchangeMessage`].
//!
//! ## Design
//!
//! Kinds are the closed enum `MessageKind`, so the table is exhaustive by
//! construction: adding a kind fails to compile until it has a row. The
//! string forms exist only for payloads whose kind has not yet been
//! decoded, and treat unknown kinds as never valid.

pub mod exchange;
pub mod registry;

pub use exchange::{Exchange, ExchangeError, ExchangeMessage};
pub use registry::{
    entry, is_valid_next, is_valid_next_str, kind_table, lookup, resource_schema_name, valid_next,
    KindEntry, MESSAGE_ENVELOPE_SCHEMA, RESOURCE_ENVELOPE_SCHEMA, RFQ_PRIVATE_SCHEMA,
};
