//! # Selective Disclosure
//!
//! Salted hash commitments over an RFQ's sensitive fields.
//!
//! The public `data` of an RFQ carries a commitment for each sensitive
//! field; the cleartext travels in the unsigned `privateData` beside it,
//! together with one salt shared by all fields of the message:
//!
//! ```text
//! commitment = base64url(SHA-256(JCS([salt, value])))
//! ```
//!
//! Because the commitments sit inside the signed `data`, the signature
//! authenticates the private values indirectly. Private data can then be
//! dropped before storage or forwarding without invalidating the
//! signature.
//!
//! ## Security Invariant
//!
//! A commitment present in `data` must never be accepted as matching
//! revealed private data unless the recomputed commitment is byte-equal.
//! Revealed data without a commitment is rejected outright.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fxp_core::{digest_of, CanonicalizationError};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MessageError;
use crate::rfq::{
    CreateRfqData, PrivatePaymentDetails, RfqData, RfqPrivateData, SelectedPayinMethod,
    SelectedPayoutMethod,
};

/// Salt length in bytes before encoding.
pub const SALT_LEN: usize = 16;

/// Field label for the payin payment details.
pub const PAYIN_DETAILS_FIELD: &str = "payin.paymentDetails";
/// Field label for the payout payment details.
pub const PAYOUT_DETAILS_FIELD: &str = "payout.paymentDetails";
/// Field label for the claims.
pub const CLAIMS_FIELD: &str = "claims";

/// Generate a fresh base64url salt from the OS RNG.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Commitment over `value` under `salt`.
pub fn commitment(salt: &str, value: &impl Serialize) -> Result<String, CanonicalizationError> {
    Ok(digest_of(&(salt, value))?.to_base64url())
}

/// Split cleartext RFQ input into public data and private data under a
/// fresh salt.
pub fn seal(input: CreateRfqData) -> Result<(RfqData, Option<RfqPrivateData>), MessageError> {
    seal_with_salt(input, generate_salt())
}

/// [`seal`] with an explicit salt.
///
/// Empty payment details and an empty claims list count as absent: no
/// commitment is made and nothing is placed in private data. When no field
/// is present at all, there is no private data.
pub fn seal_with_salt(
    input: CreateRfqData,
    salt: String,
) -> Result<(RfqData, Option<RfqPrivateData>), MessageError> {
    let payin_details = non_empty_map(input.payin.payment_details);
    let payout_details = non_empty_map(input.payout.payment_details);
    let claims = (!input.claims.is_empty()).then_some(input.claims);

    let payin_hash = payin_details
        .as_ref()
        .map(|d| commitment(&salt, d))
        .transpose()?;
    let payout_hash = payout_details
        .as_ref()
        .map(|d| commitment(&salt, d))
        .transpose()?;
    let claims_hash = claims
        .as_ref()
        .map(|c| commitment(&salt, c))
        .transpose()?;

    let data = RfqData {
        offering_id: input.offering_id,
        payin: SelectedPayinMethod {
            amount: input.payin.amount,
            kind: input.payin.kind,
            payment_details_hash: payin_hash,
        },
        payout: SelectedPayoutMethod {
            kind: input.payout.kind,
            payment_details_hash: payout_hash,
        },
        claims_hash,
    };

    let private = if payin_details.is_none() && payout_details.is_none() && claims.is_none() {
        None
    } else {
        Some(RfqPrivateData {
            salt,
            payin: payin_details.map(PrivatePaymentDetails::with_details),
            payout: payout_details.map(PrivatePaymentDetails::with_details),
            claims,
        })
    };
    Ok((data, private))
}

/// Verify revealed private data against the commitments in `data`.
///
/// For each sensitive field:
///
/// - commitment and cleartext present: the recomputed commitment must match;
/// - cleartext without a commitment: rejected;
/// - commitment without cleartext: rejected only when
///   `require_private_data` is set;
/// - neither: accepted.
pub fn verify_disclosure(
    data: &RfqData,
    private: Option<&RfqPrivateData>,
    require_private_data: bool,
) -> Result<(), MessageError> {
    let salt = private.map(|p| p.salt.as_str()).unwrap_or_default();
    check_field(
        PAYIN_DETAILS_FIELD,
        data.payin.payment_details_hash.as_deref(),
        private.and_then(|p| p.payin_details()),
        salt,
        require_private_data,
    )?;
    check_field(
        PAYOUT_DETAILS_FIELD,
        data.payout.payment_details_hash.as_deref(),
        private.and_then(|p| p.payout_details()),
        salt,
        require_private_data,
    )?;
    check_field(
        CLAIMS_FIELD,
        data.claims_hash.as_deref(),
        private.and_then(|p| p.claims.as_ref()),
        salt,
        require_private_data,
    )
}

fn check_field<T: Serialize>(
    field: &str,
    committed: Option<&str>,
    revealed: Option<&T>,
    salt: &str,
    require_private_data: bool,
) -> Result<(), MessageError> {
    match (committed, revealed) {
        (Some(expected), Some(value)) => {
            if commitment(salt, value)? == expected {
                Ok(())
            } else {
                tracing::warn!(field, "private data does not match commitment");
                Err(MessageError::DisclosureMismatch {
                    field: field.to_string(),
                })
            }
        }
        (None, Some(_)) => {
            tracing::warn!(field, "private data revealed without commitment");
            Err(MessageError::DisclosureMismatch {
                field: field.to_string(),
            })
        }
        (Some(_), None) if require_private_data => Err(MessageError::MissingPrivateData {
            field: field.to_string(),
        }),
        (Some(_), None) | (None, None) => Ok(()),
    }
}

fn non_empty_map(map: Option<Map<String, Value>>) -> Option<Map<String, Value>> {
    map.filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfq::{CreateSelectedPayinMethod, CreateSelectedPayoutMethod};
    use fxp_core::DocumentId;
    use proptest::prelude::*;
    use serde_json::json;

    fn details(v: Value) -> Option<Map<String, Value>> {
        match v {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    fn input() -> CreateRfqData {
        CreateRfqData {
            offering_id: DocumentId::new("offering_abc").unwrap(),
            payin: CreateSelectedPayinMethod {
                amount: "100.00".into(),
                kind: "DEBIT_CARD".into(),
                payment_details: details(json!({"cardNumber": "4111111111111111", "cvv": "123"})),
            },
            payout: CreateSelectedPayoutMethod {
                kind: "BANK_TRANSFER".into(),
                payment_details: details(json!({"accountNumber": "1234567890123456"})),
            },
            claims: vec!["eyJhbGciOiJFZERTQSJ9.e30.c2ln".into()],
        }
    }

    #[test]
    fn test_commitment_vector() {
        let details = json!({"accountNumber": "1234567890123456"});
        assert_eq!(
            commitment("c2FsdA", &details).unwrap(),
            "fu6o5z8uUvWuZ_mOglBtvq3JsUzN1fLcCYxBeTXWF6Q"
        );
    }

    #[test]
    fn test_salt_shape() {
        let salt = generate_salt();
        assert_eq!(URL_SAFE_NO_PAD.decode(&salt).unwrap().len(), SALT_LEN);
        assert_ne!(salt, generate_salt());
    }

    #[test]
    fn test_seal_commits_every_field() {
        let (data, private) = seal(input()).unwrap();
        let private = private.unwrap();
        assert!(data.payin.payment_details_hash.is_some());
        assert!(data.payout.payment_details_hash.is_some());
        assert!(data.claims_hash.is_some());
        assert_eq!(private.claims.as_ref().unwrap().len(), 1);
        verify_disclosure(&data, Some(&private), true).unwrap();
    }

    #[test]
    fn test_seal_skips_empty_fields() {
        let mut inp = input();
        inp.payin.payment_details = Some(Map::new());
        inp.payout.payment_details = None;
        inp.claims.clear();
        let (data, private) = seal(inp).unwrap();
        assert!(data.payin.payment_details_hash.is_none());
        assert!(data.payout.payment_details_hash.is_none());
        assert!(data.claims_hash.is_none());
        assert!(private.is_none());
        verify_disclosure(&data, None, true).unwrap();
    }

    #[test]
    fn test_corrupted_salt_fails() {
        let (data, private) = seal(input()).unwrap();
        let mut private = private.unwrap();
        private.salt = generate_salt();
        assert!(matches!(
            verify_disclosure(&data, Some(&private), false),
            Err(MessageError::DisclosureMismatch { .. })
        ));
    }

    #[test]
    fn test_changed_details_fail_on_that_field() {
        let (data, private) = seal(input()).unwrap();
        let mut private = private.unwrap();
        private.payout = details(json!({"accountNumber": "0000"})).map(PrivatePaymentDetails::with_details);
        match verify_disclosure(&data, Some(&private), false) {
            Err(MessageError::DisclosureMismatch { field }) => assert_eq!(field, PAYOUT_DETAILS_FIELD),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_revealed_without_commitment_fails() {
        let (mut data, private) = seal(input()).unwrap();
        data.claims_hash = None;
        assert!(matches!(
            verify_disclosure(&data, private.as_ref(), false),
            Err(MessageError::DisclosureMismatch { .. })
        ));
    }

    #[test]
    fn test_stripped_private_data() {
        let (data, _) = seal(input()).unwrap();
        verify_disclosure(&data, None, false).unwrap();
        match verify_disclosure(&data, None, true) {
            Err(MessageError::MissingPrivateData { field }) => assert_eq!(field, PAYIN_DETAILS_FIELD),
            other => panic!("unexpected: {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn test_commitment_binds_value(a in "[a-z0-9]{1,24}", b in "[a-z0-9]{1,24}") {
            let salt = generate_salt();
            let ca = commitment(&salt, &json!({"accountNumber": a})).unwrap();
            let cb = commitment(&salt, &json!({"accountNumber": b})).unwrap();
            prop_assert_eq!(a == b, ca == cb);
        }

        #[test]
        fn test_seal_then_verify(account in "[0-9]{4,20}", claim in "[A-Za-z0-9._-]{1,40}") {
            let mut inp = input();
            inp.payout.payment_details = details(json!({"accountNumber": account}));
            inp.claims = vec![claim];
            let (data, private) = seal(inp).unwrap();
            prop_assert!(verify_disclosure(&data, private.as_ref(), true).is_ok());
        }
    }
}
