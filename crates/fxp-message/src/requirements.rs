//! # Offering Requirements
//!
//! Checks an RFQ against the offering it references: protocol, offering
//! id, payin amount limits, payment method kinds, required payment details
//! and required claims.
//!
//! Amounts are compared as [`Decimal`], never as floats. Private data is
//! verified against its commitments before it is inspected, so a check
//! never passes on details the customer did not sign for.

use std::str::FromStr;

use fxp_schema::validate_with_schema;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::disclosure;
use crate::error::MessageError;
use crate::offering::Offering;
use crate::rfq::Rfq;

impl Rfq {
    /// Fail unless this RFQ satisfies every requirement of `offering`.
    pub fn verify_offering_requirements(&self, offering: &Offering) -> Result<(), MessageError> {
        if self.metadata.protocol != offering.metadata.protocol {
            return Err(requirement(format!(
                "protocol {} does not match offering protocol {}",
                self.metadata.protocol, offering.metadata.protocol
            )));
        }
        if self.data.offering_id != offering.metadata.id {
            return Err(requirement(format!(
                "offeringId {} does not match offering {}",
                self.data.offering_id, offering.metadata.id
            )));
        }

        disclosure::verify_disclosure(&self.data, self.private_data.as_ref(), false)?;
        let private = self.private_data.as_ref();
        let offer = &offering.data;

        let amount = parse_decimal("payin amount", &self.data.payin.amount)?;
        check_limits(
            "payin amount",
            amount,
            offer.payin.min.as_deref(),
            offer.payin.max.as_deref(),
        )?;

        let payin_method = offer.payin_method(&self.data.payin.kind).ok_or_else(|| {
            requirement(format!(
                "payin kind {} is not offered",
                self.data.payin.kind
            ))
        })?;
        check_limits(
            "payin amount",
            amount,
            payin_method.min.as_deref(),
            payin_method.max.as_deref(),
        )?;
        check_payment_details(
            disclosure::PAYIN_DETAILS_FIELD,
            payin_method.required_payment_details.as_ref(),
            private.and_then(|p| p.payin_details()),
        )?;

        let payout_method = offer.payout_method(&self.data.payout.kind).ok_or_else(|| {
            requirement(format!(
                "payout kind {} is not offered",
                self.data.payout.kind
            ))
        })?;
        check_payment_details(
            disclosure::PAYOUT_DETAILS_FIELD,
            payout_method.required_payment_details.as_ref(),
            private.and_then(|p| p.payout_details()),
        )?;

        if offer.required_claims.is_some() {
            let has_claims = private
                .and_then(|p| p.claims.as_ref())
                .is_some_and(|c| !c.is_empty());
            if !has_claims {
                return Err(requirement("offering requires claims".to_string()));
            }
        }

        tracing::debug!(rfq = %self.metadata.id, offering = %offering.metadata.id, "offering requirements met");
        Ok(())
    }
}

fn requirement(reason: String) -> MessageError {
    MessageError::OfferingRequirement(reason)
}

fn parse_decimal(what: &str, value: &str) -> Result<Decimal, MessageError> {
    Decimal::from_str(value).map_err(|e| requirement(format!("{what} {value:?}: {e}")))
}

fn check_limits(
    what: &str,
    amount: Decimal,
    min: Option<&str>,
    max: Option<&str>,
) -> Result<(), MessageError> {
    if let Some(min) = min {
        if amount < parse_decimal("minimum", min)? {
            return Err(requirement(format!("{what} {amount} is below minimum {min}")));
        }
    }
    if let Some(max) = max {
        if amount > parse_decimal("maximum", max)? {
            return Err(requirement(format!("{what} {amount} exceeds maximum {max}")));
        }
    }
    Ok(())
}

fn check_payment_details(
    field: &str,
    schema: Option<&Value>,
    details: Option<&Map<String, Value>>,
) -> Result<(), MessageError> {
    let Some(schema) = schema else {
        return Ok(());
    };
    let Some(details) = details else {
        return Err(MessageError::MissingPrivateData {
            field: field.to_string(),
        });
    };
    validate_with_schema(schema, &Value::Object(details.clone()), field)?;
    Ok(())
}
