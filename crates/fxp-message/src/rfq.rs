//! # Request for Quote
//!
//! The message that opens an exchange. Its sensitive fields (payment
//! details and claims) appear in the signed `data` only as salted
//! commitments; the cleartext travels in `privateData`. See
//! [`crate::disclosure`].

use fxp_core::{Did, DocumentId, MessageKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::disclosure;
use crate::error::MessageError;
use crate::message::{Message, MessageData};
use crate::metadata::MessageOptions;

/// Public data of an RFQ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqData {
    /// Offering the RFQ is made against.
    pub offering_id: DocumentId,
    /// Selected payin method and amount.
    pub payin: SelectedPayinMethod,
    /// Selected payout method.
    pub payout: SelectedPayoutMethod,
    /// Commitment to the claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_hash: Option<String>,
}

/// Payin method chosen by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPayinMethod {
    /// Payin amount, as a decimal string.
    pub amount: String,
    /// Payment method kind, matching one the offering lists.
    pub kind: String,
    /// Commitment to the payment details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details_hash: Option<String>,
}

/// Payout method chosen by the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPayoutMethod {
    /// Payment method kind, matching one the offering lists.
    pub kind: String,
    /// Commitment to the payment details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details_hash: Option<String>,
}

/// Cleartext behind an RFQ's commitments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqPrivateData {
    /// Salt shared by every commitment of the message.
    pub salt: String,
    /// Payin payment details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payin: Option<PrivatePaymentDetails>,
    /// Payout payment details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout: Option<PrivatePaymentDetails>,
    /// Claims, typically verifiable credentials in compact form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<String>>,
}

impl RfqPrivateData {
    /// Revealed payin payment details.
    pub fn payin_details(&self) -> Option<&Map<String, Value>> {
        self.payin.as_ref().and_then(|p| p.payment_details.as_ref())
    }

    /// Revealed payout payment details.
    pub fn payout_details(&self) -> Option<&Map<String, Value>> {
        self.payout.as_ref().and_then(|p| p.payment_details.as_ref())
    }
}

/// Payment details wrapper inside private data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivatePaymentDetails {
    /// The details object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<Map<String, Value>>,
}

impl PrivatePaymentDetails {
    /// Wrap a details object.
    pub fn with_details(details: Map<String, Value>) -> Self {
        Self {
            payment_details: Some(details),
        }
    }
}

impl MessageData for RfqData {
    const KIND: MessageKind = MessageKind::Rfq;
    type Private = RfqPrivateData;

    fn check_private(
        &self,
        private: Option<&RfqPrivateData>,
        require_private_data: bool,
    ) -> Result<(), MessageError> {
        disclosure::verify_disclosure(self, private, require_private_data)
    }
}

// ─── Construction Input ──────────────────────────────────────────────

/// Cleartext input for creating an RFQ.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRfqData {
    /// Offering the RFQ is made against.
    pub offering_id: DocumentId,
    /// Selected payin method with cleartext details.
    pub payin: CreateSelectedPayinMethod,
    /// Selected payout method with cleartext details.
    pub payout: CreateSelectedPayoutMethod,
    /// Claims to disclose.
    pub claims: Vec<String>,
}

/// Payin selection with cleartext details.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSelectedPayinMethod {
    /// Payin amount, as a decimal string.
    pub amount: String,
    /// Payment method kind.
    pub kind: String,
    /// Payment details.
    pub payment_details: Option<Map<String, Value>>,
}

/// Payout selection with cleartext details.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSelectedPayoutMethod {
    /// Payment method kind.
    pub kind: String,
    /// Payment details.
    pub payment_details: Option<Map<String, Value>>,
}

/// An RFQ message.
pub type Rfq = Message<RfqData>;

impl Message<RfqData> {
    /// Create an unsigned RFQ, sealing the sensitive fields of `input`
    /// behind commitments under a fresh salt.
    pub fn create_rfq(
        from: Did,
        to: Did,
        input: CreateRfqData,
        opts: MessageOptions,
    ) -> Result<Self, MessageError> {
        let (data, private_data) = disclosure::seal(input)?;
        let mut rfq = Self::create(from, to, data, opts)?;
        rfq.private_data = private_data;
        Ok(rfq)
    }

    /// Drop the private data. The signature stays valid.
    pub fn strip_private_data(&mut self) -> Option<RfqPrivateData> {
        self.private_data.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxp_crypto::{DigestSigner, JwsVerifier, LocalSigner};
    use serde_json::json;

    fn input() -> CreateRfqData {
        CreateRfqData {
            offering_id: DocumentId::new("offering_abc").unwrap(),
            payin: CreateSelectedPayinMethod {
                amount: "100.00".into(),
                kind: "DEBIT_CARD".into(),
                payment_details: None,
            },
            payout: CreateSelectedPayoutMethod {
                kind: "BANK_TRANSFER".into(),
                payment_details: json!({"accountNumber": "1234567890123456"})
                    .as_object()
                    .cloned(),
            },
            claims: vec![],
        }
    }

    #[test]
    fn test_create_rfq_seals_details() {
        let alice = LocalSigner::from_seed(&[1; 32]).unwrap();
        let pfi = LocalSigner::from_seed(&[2; 32]).unwrap();
        let rfq = Rfq::create_rfq(
            alice.identity().clone(),
            pfi.identity().clone(),
            input(),
            MessageOptions::default(),
        )
        .unwrap();
        assert_eq!(rfq.metadata.exchange_id, rfq.metadata.id);
        assert!(rfq.data.payout.payment_details_hash.is_some());
        assert!(rfq.data.payin.payment_details_hash.is_none());
        let json = serde_json::to_value(&rfq.data).unwrap();
        assert!(!json.to_string().contains("1234567890123456"));
        rfq.verify_private_data(true).unwrap();
    }

    #[test]
    fn test_strip_keeps_signature_valid() {
        let alice = LocalSigner::from_seed(&[1; 32]).unwrap();
        let pfi = LocalSigner::from_seed(&[2; 32]).unwrap();
        let mut rfq = Rfq::create_rfq(
            alice.identity().clone(),
            pfi.identity().clone(),
            input(),
            MessageOptions::default(),
        )
        .unwrap();
        rfq.sign(&alice).unwrap();
        assert!(rfq.strip_private_data().is_some());
        rfq.verify(&JwsVerifier::new()).unwrap();
        rfq.verify_private_data(false).unwrap();
        assert!(rfq.verify_private_data(true).is_err());
    }

    #[test]
    fn test_private_data_wire_names() {
        let alice = LocalSigner::from_seed(&[1; 32]).unwrap();
        let rfq = Rfq::create_rfq(
            alice.identity().clone(),
            alice.identity().clone(),
            input(),
            MessageOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&rfq).unwrap();
        assert!(json["privateData"]["salt"].is_string());
        assert_eq!(
            json["privateData"]["payout"]["paymentDetails"]["accountNumber"],
            "1234567890123456"
        );
        assert!(json["data"]["payout"]["paymentDetailsHash"].is_string());
        assert_eq!(json["data"]["offeringId"], "offering_abc");
    }
}
