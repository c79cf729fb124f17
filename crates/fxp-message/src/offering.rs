//! # Offering
//!
//! A PFI's published willingness to exchange one currency for another:
//! rate, limits, accepted payment methods and the payment details and
//! claims an RFQ must supply.

use fxp_core::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::{Resource, ResourceData};

/// Data of an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingData {
    /// Human-readable description.
    pub description: String,
    /// Exchange rate, as a decimal string.
    pub payout_units_per_payin_unit: String,
    /// Accepted payin side.
    pub payin: PayinDetails,
    /// Offered payout side.
    pub payout: PayoutDetails,
    /// Presentation definition the RFQ's claims must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_claims: Option<Value>,
    /// Cancellation policy.
    pub cancellation: CancellationDetails,
}

/// Payin side of an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayinDetails {
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Minimum payin amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Maximum payin amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Accepted payin methods.
    pub methods: Vec<PayinMethod>,
}

/// Payout side of an offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetails {
    /// ISO 4217 currency code.
    pub currency_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Offered payout methods.
    pub methods: Vec<PayoutMethod>,
}

/// An accepted payin method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayinMethod {
    /// Method kind, e.g. `DEBIT_CARD`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// JSON Schema the RFQ's payment details must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_payment_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

/// An offered payout method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutMethod {
    /// Method kind, e.g. `BANK_TRANSFER`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// JSON Schema the RFQ's payment details must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_payment_details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Estimated settlement time in seconds.
    pub estimated_settlement_time: u64,
}

/// Cancellation policy of an offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationDetails {
    /// Whether orders may be cancelled.
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl ResourceData for OfferingData {
    const KIND: ResourceKind = ResourceKind::Offering;
}

impl OfferingData {
    /// The payin method of `kind`.
    pub fn payin_method(&self, kind: &str) -> Option<&PayinMethod> {
        self.payin.methods.iter().find(|m| m.kind == kind)
    }

    /// The payout method of `kind`.
    pub fn payout_method(&self, kind: &str) -> Option<&PayoutMethod> {
        self.payout.methods.iter().find(|m| m.kind == kind)
    }
}

/// An offering resource.
pub type Offering = Resource<OfferingData>;
