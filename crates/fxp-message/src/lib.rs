//! # fxp-message — Protocol Documents
//!
//! The typed documents of the exchange protocol and the machinery that
//! makes them trustworthy:
//!
//! - **Messages** (`message.rs` and one module per kind): RFQ, quote,
//!   order, order instructions, order status, cancel and close, each a
//!   [`Message<D>`] whose kind is fixed by its data type.
//! - **Resources** (`resource.rs`, `offering.rs`, `balance.rs`):
//!   PFI-published offerings and balances.
//! - **Signature binding** (`signature.rs`): a detached signature over
//!   the canonical digest of `{metadata, data}`.
//! - **Selective disclosure** (`disclosure.rs`): salted commitments that
//!   let an RFQ's private data be authenticated and still be dropped.
//! - **Dispatcher** (`dispatch.rs`): untrusted bytes in, schema-validated
//!   and authenticated typed documents out.
//! - **Offering requirements** (`requirements.rs`): an RFQ checked
//!   against the offering it references.
//!
//! ## Crate Policy
//!
//! - Schemas and signing keys are reached only through the
//!   [`fxp_schema::SchemaCheck`], [`fxp_crypto::DigestSigner`] and
//!   [`fxp_crypto::TokenVerifier`] traits.
//! - No global state: the dispatcher borrows its collaborators.
//! - Amounts stay decimal strings on the wire and are compared as
//!   `rust_decimal::Decimal`, never as floats.

pub mod any;
pub mod balance;
pub mod disclosure;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod metadata;
pub mod offering;
pub mod order;
pub mod quote;
pub mod requirements;
pub mod resource;
pub mod rfq;
pub mod signature;

pub use any::{AnyMessage, AnyResource};
pub use balance::{Balance, BalanceData};
pub use disclosure::{commitment, generate_salt, verify_disclosure};
pub use dispatch::{Dispatcher, ParseOptions};
pub use error::MessageError;
pub use message::{Message, MessageData, NoPrivateData};
pub use metadata::{MessageMetadata, MessageOptions, ResourceMetadata, ResourceOptions};
pub use offering::{
    CancellationDetails, Offering, OfferingData, PayinDetails, PayinMethod, PayoutDetails,
    PayoutMethod,
};
pub use order::{
    Cancel, CancelData, Close, CloseData, Order, OrderData, OrderInstructions,
    OrderInstructionsData, OrderStatus, OrderStatusData, OrderStatusKind, PaymentInstruction,
};
pub use quote::{Quote, QuoteData, QuoteDetails};
pub use resource::{Resource, ResourceData};
pub use rfq::{
    CreateRfqData, CreateSelectedPayinMethod, CreateSelectedPayoutMethod, PrivatePaymentDetails,
    Rfq, RfqData, RfqPrivateData, SelectedPayinMethod, SelectedPayoutMethod,
};
