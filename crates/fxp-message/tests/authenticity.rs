//! # Authenticity at the Trust Boundary
//!
//! Wire payloads that must be rejected by `parse_message`, and the error
//! each one produces.

use fxp_core::{DocumentId, MessageKind};
use fxp_crypto::{DigestSigner, JwsVerifier, LocalSigner};
use fxp_message::{
    AnyMessage, CloseData, CreateRfqData, CreateSelectedPayinMethod, CreateSelectedPayoutMethod,
    Dispatcher, Message, MessageError, MessageOptions, ParseOptions, Rfq,
};
use fxp_schema::SchemaRegistry;
use proptest::prelude::*;
use serde_json::{json, Value};

fn key(seed: u8) -> LocalSigner {
    LocalSigner::from_seed(&[seed; 32]).expect("key")
}

fn signed_rfq(alice: &LocalSigner, pfi: &LocalSigner) -> Rfq {
    let input = CreateRfqData {
        offering_id: DocumentId::new("offering_01").unwrap(),
        payin: CreateSelectedPayinMethod {
            amount: "250.00".into(),
            kind: "DEBIT_CARD".into(),
            payment_details: json!({"cardNumber": "4111111111111111"}).as_object().cloned(),
        },
        payout: CreateSelectedPayoutMethod {
            kind: "BANK_TRANSFER".into(),
            payment_details: json!({"accountNumber": "1234567890123456"})
                .as_object()
                .cloned(),
        },
        claims: vec![],
    };
    let mut rfq = Rfq::create_rfq(
        alice.identity().clone(),
        pfi.identity().clone(),
        input,
        MessageOptions::default(),
    )
    .unwrap();
    rfq.sign(alice).unwrap();
    rfq
}

fn parse(value: &Value) -> Result<AnyMessage, MessageError> {
    let schemas = SchemaRegistry::embedded().unwrap();
    let verifier = JwsVerifier::new();
    let dispatcher = Dispatcher::new(&schemas, &verifier);
    dispatcher.parse_message(&serde_json::to_vec(value).unwrap(), &ParseOptions::default())
}

#[test]
fn test_round_trip_preserves_digest() {
    let rfq = signed_rfq(&key(1), &key(2));
    let parsed = parse(&serde_json::to_value(&rfq).unwrap()).unwrap();
    assert_eq!(parsed.digest().unwrap(), rfq.digest().unwrap());
    assert_eq!(parsed.to_json().unwrap(), rfq.to_json().unwrap());
    assert_eq!(parsed, AnyMessage::Rfq(rfq));
}

#[test]
fn test_rfq_without_private_data_round_trip() {
    let alice = key(1);
    let pfi = key(2);
    let input = CreateRfqData {
        offering_id: DocumentId::new("offering_01").unwrap(),
        payin: CreateSelectedPayinMethod {
            amount: "100".into(),
            kind: "DEBIT_CARD".into(),
            payment_details: None,
        },
        payout: CreateSelectedPayoutMethod {
            kind: "BANK_ACCOUNT".into(),
            payment_details: None,
        },
        claims: vec![],
    };
    let mut rfq = Rfq::create_rfq(
        alice.identity().clone(),
        pfi.identity().clone(),
        input,
        MessageOptions::default(),
    )
    .unwrap();
    rfq.sign(&alice).unwrap();
    assert!(rfq.data.payin.payment_details_hash.is_none());
    assert!(rfq.data.payout.payment_details_hash.is_none());
    assert!(rfq.data.claims_hash.is_none());
    assert!(rfq.private_data.is_none());

    let wire = serde_json::to_value(&rfq).unwrap();
    assert!(wire.get("privateData").is_none());

    let schemas = SchemaRegistry::embedded().unwrap();
    let verifier = JwsVerifier::new();
    let dispatcher = Dispatcher::new(&schemas, &verifier);
    let strict = ParseOptions {
        require_private_data: true,
        ..ParseOptions::default()
    };
    let parsed = dispatcher
        .parse_message(&serde_json::to_vec(&wire).unwrap(), &strict)
        .expect("nothing committed, nothing required");
    let signer = parsed.verify(&verifier).unwrap();
    assert_eq!(&signer, alice.identity());
    assert_eq!(signer, parsed.metadata().from);
    assert_eq!(parsed, AnyMessage::Rfq(rfq));
}

#[test]
fn test_unknown_kind() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    value["metadata"]["kind"] = json!("hoarder");
    match parse(&value) {
        Err(MessageError::UnknownKind(kind)) => assert_eq!(kind, "hoarder"),
        other => panic!("expected UnknownKind, got {other:?}"),
    }
}

#[test]
fn test_signed_by_other_key() {
    let k1 = key(1);
    let k2 = key(2);
    let mut close = Message::create(
        k2.identity().clone(),
        k1.identity().clone(),
        CloseData::default(),
        MessageOptions::in_exchange(DocumentId::generate("rfq")),
    )
    .unwrap();
    close.sign(&k1).unwrap();
    assert!(matches!(
        parse(&serde_json::to_value(&close).unwrap()),
        Err(MessageError::SignerMismatch { .. })
    ));
}

#[test]
fn test_missing_signature() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    value.as_object_mut().unwrap().remove("signature");
    assert!(matches!(parse(&value), Err(MessageError::EmptySignature)));

    let schemas = SchemaRegistry::embedded().unwrap();
    let verifier = JwsVerifier::new();
    let dispatcher = Dispatcher::new(&schemas, &verifier);
    let unchecked = ParseOptions {
        verify_signature: false,
        ..ParseOptions::default()
    };
    let msg = dispatcher
        .parse_message(&serde_json::to_vec(&value).unwrap(), &unchecked)
        .expect("signature check disabled");
    assert_eq!(msg.kind(), MessageKind::Rfq);
}

#[test]
fn test_corrupted_salt() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    value["privateData"]["salt"] = json!("AAAAAAAAAAAAAAAAAAAAAA");
    assert!(matches!(
        parse(&value),
        Err(MessageError::DisclosureMismatch { .. })
    ));
}

#[test]
fn test_swapped_private_details() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    let payin = value["privateData"]["payin"].clone();
    value["privateData"]["payin"] = value["privateData"]["payout"].clone();
    value["privateData"]["payout"] = payin;
    assert!(matches!(
        parse(&value),
        Err(MessageError::DisclosureMismatch { .. })
    ));
}

#[test]
fn test_schema_rejects_before_decode() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    value["data"]["payin"]["amount"] = json!(250);
    match parse(&value) {
        Err(MessageError::SchemaValidation(e)) => {
            let violations = e.violations().expect("violations");
            assert!(!violations.is_empty());
        }
        other => panic!("expected SchemaValidation, got {other:?}"),
    }
}

#[test]
fn test_unknown_data_field_rejected() {
    let mut value = serde_json::to_value(signed_rfq(&key(1), &key(2))).unwrap();
    value["data"]["note"] = json!("extra");
    assert!(matches!(
        parse(&value),
        Err(MessageError::SchemaValidation(_))
    ));
}

#[test]
fn test_rfq_must_open_own_exchange() {
    let alice = key(1);
    let mut rfq = signed_rfq(&alice, &key(2));
    rfq.metadata.exchange_id = DocumentId::generate("rfq");
    rfq.sign(&alice).unwrap();
    assert!(matches!(
        parse(&serde_json::to_value(&rfq).unwrap()),
        Err(MessageError::ExchangeIdMismatch { .. })
    ));
}

#[test]
fn test_id_must_carry_kind() {
    let alice = key(1);
    let mut rfq = signed_rfq(&alice, &key(2));
    let id = DocumentId::new("quote_01").unwrap();
    rfq.metadata.id = id.clone();
    rfq.metadata.exchange_id = id;
    rfq.sign(&alice).unwrap();
    assert!(matches!(
        parse(&serde_json::to_value(&rfq).unwrap()),
        Err(MessageError::InvalidId { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_any_amount_change_breaks_signature(cents in 0u32..1_000_000) {
        let rfq = signed_rfq(&key(1), &key(2));
        let amount = format!("{}.{:02}", cents / 100, cents % 100);
        prop_assume!(amount != rfq.data.payin.amount);
        let mut value = serde_json::to_value(&rfq).unwrap();
        value["data"]["payin"]["amount"] = json!(amount);
        prop_assert!(matches!(
            parse(&value),
            Err(MessageError::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_any_reason_change_breaks_signature(reason in "[ -~]{0,40}") {
        let k = key(3);
        let mut close = Message::create(
            k.identity().clone(),
            key(4).identity().clone(),
            CloseData { reason: Some("original".into()), success: None },
            MessageOptions::in_exchange(DocumentId::generate("rfq")),
        )
        .unwrap();
        close.sign(&k).unwrap();
        prop_assume!(reason != "original");
        let mut value = serde_json::to_value(&close).unwrap();
        value["data"]["reason"] = json!(reason);
        prop_assert!(matches!(
            parse(&value),
            Err(MessageError::SignatureVerification(_))
        ));
    }
}
