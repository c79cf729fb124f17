//! # Order Lifecycle Messages
//!
//! Order, order instructions, order status, cancel and close: the messages
//! exchanged after a quote is accepted. None carries private data.

use fxp_core::MessageKind;
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageData, NoPrivateData};

/// Data of an order. Always the empty object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderData {}

impl MessageData for OrderData {
    const KIND: MessageKind = MessageKind::Order;
    type Private = NoPrivateData;
}

/// Data of order instructions: how to pay in and where payout goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInstructionsData {
    /// Instructions for paying in.
    pub payin: PaymentInstruction,
    /// Instructions for receiving payout.
    pub payout: PaymentInstruction,
}

/// One payment instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Link to complete the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Human-readable instruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl MessageData for OrderInstructionsData {
    const KIND: MessageKind = MessageKind::OrderInstructions;
    type Private = NoPrivateData;
}

/// Settlement progress reported by the PFI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusKind {
    PayinPending,
    PayinInitiated,
    PayinSettled,
    PayinFailed,
    PayinExpired,
    PayoutPending,
    PayoutInitiated,
    PayoutSettled,
    PayoutFailed,
    RefundPending,
    RefundInitiated,
    RefundFailed,
    RefundSettled,
}

/// Data of an order status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusData {
    /// Current status.
    pub status: OrderStatusKind,
    /// Free-form detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl MessageData for OrderStatusData {
    const KIND: MessageKind = MessageKind::OrderStatus;
    type Private = NoPrivateData;
}

/// Data of a cancel request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelData {
    /// Why the customer cancels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MessageData for CancelData {
    const KIND: MessageKind = MessageKind::Cancel;
    type Private = NoPrivateData;
}

/// Data of a close. Terminal for the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseData {
    /// Why the exchange closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Whether the exchange completed successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl MessageData for CloseData {
    const KIND: MessageKind = MessageKind::Close;
    type Private = NoPrivateData;
}

/// An order message.
pub type Order = Message<OrderData>;
/// An order instructions message.
pub type OrderInstructions = Message<OrderInstructionsData>;
/// An order status message.
pub type OrderStatus = Message<OrderStatusData>;
/// A cancel message.
pub type Cancel = Message<CancelData>;
/// A close message.
pub type Close = Message<CloseData>;
