//! # Balance
//!
//! A PFI-published statement of funds available to a customer.

use fxp_core::ResourceKind;
use serde::{Deserialize, Serialize};

use crate::resource::{Resource, ResourceData};

/// Data of a balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Available amount, as a decimal string.
    pub available: String,
}

impl ResourceData for BalanceData {
    const KIND: ResourceKind = ResourceKind::Balance;
}

/// A balance resource.
pub type Balance = Resource<BalanceData>;
