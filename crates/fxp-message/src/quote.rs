//! # Quote
//!
//! The PFI's priced response to an RFQ.

use fxp_core::{MessageKind, Timestamp};
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageData, NoPrivateData};

/// Data of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    /// When the quote stops being honored.
    pub expires_at: Timestamp,
    /// Exchange rate, as a decimal string.
    pub payout_units_per_payin_unit: String,
    /// Payin side of the quote.
    pub payin: QuoteDetails,
    /// Payout side of the quote.
    pub payout: QuoteDetails,
}

/// One side of a quote. Amounts are decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetails {
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Amount before fees.
    pub subtotal: String,
    /// Fee, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    /// Amount including fees.
    pub total: String,
}

impl MessageData for QuoteData {
    const KIND: MessageKind = MessageKind::Quote;
    type Private = NoPrivateData;
}

/// A quote message.
pub type Quote = Message<QuoteData>;

impl Message<QuoteData> {
    /// Whether the quote has expired at `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        !now.is_before(&self.data.expires_at)
    }
}
