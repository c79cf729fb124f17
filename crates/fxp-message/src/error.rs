//! # Message Error Types
//!
//! Every failure the message layer can report. None is transient: each
//! indicates a malformed or tampered document, or a programming error, and
//! must surface to the application for an explicit decision. Nothing here
//! is retried automatically.

use fxp_core::{CanonicalizationError, MessageKind};
use fxp_crypto::CryptoError;
use fxp_schema::SchemaValidationError;
use thiserror::Error;

/// Errors from constructing, signing, decoding or authenticating documents.
#[derive(Error, Debug)]
pub enum MessageError {
    /// The document could not be canonicalized for digesting.
    #[error("digest failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The payload does not conform to its schema.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// `metadata.kind` names no known document kind.
    #[error("unknown document kind: {0:?}")]
    UnknownKind(String),

    /// The document carries no signature.
    #[error("document has no signature")]
    EmptySignature,

    /// The signature token does not verify against the document digest.
    #[error("signature verification failed: {0}")]
    SignatureVerification(#[source] CryptoError),

    /// The signer could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(#[source] CryptoError),

    /// A valid signature by someone other than the declared sender.
    #[error("signed by {recovered}, but metadata.from is {declared}")]
    SignerMismatch {
        /// `metadata.from`.
        declared: String,
        /// Identity recovered from the signature.
        recovered: String,
    },

    /// Revealed private data does not match its signed commitment.
    #[error("private data for {field} does not match its commitment")]
    DisclosureMismatch {
        /// Which private field failed.
        field: String,
    },

    /// A commitment is present but the private data it covers is not.
    #[error("{field} is committed to but not disclosed")]
    MissingPrivateData {
        /// Which private field is missing.
        field: String,
    },

    /// The payload's kind differs from the type it is decoded into.
    #[error("expected kind {expected}, got {found}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: String,
        /// The kind the payload declares.
        found: String,
    },

    /// The document id is not prefixed with its kind.
    #[error("id {id:?} is not a {kind} id")]
    InvalidId {
        /// The offending id.
        id: String,
        /// The document kind.
        kind: String,
    },

    /// An RFQ's exchange id is not its own id, or an option disagrees.
    #[error("exchangeId {found} does not match {expected}")]
    ExchangeIdMismatch {
        /// The required exchange id.
        expected: String,
        /// The exchange id found.
        found: String,
    },

    /// A reply of a kind that may not follow the previous message.
    #[error("{to} may not follow {from}")]
    InvalidTransition {
        /// Kind of the previous message.
        from: MessageKind,
        /// Kind of the reply.
        to: MessageKind,
    },

    /// A non-RFQ message was constructed without an exchange id.
    #[error("{0} messages must name the exchange they belong to")]
    MissingExchangeId(String),

    /// The payload is not JSON, lacks `metadata.kind`, or has the wrong shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// An RFQ does not satisfy the offering it references.
    #[error("offering requirement not met: {0}")]
    OfferingRequirement(String),
}

impl MessageError {
    /// Short, stable label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Canonicalization(_) => "canonicalization",
            Self::SchemaValidation(_) => "schema",
            Self::UnknownKind(_) => "unknown_kind",
            Self::EmptySignature => "empty_signature",
            Self::SignatureVerification(_) => "signature",
            Self::Signing(_) => "signing",
            Self::SignerMismatch { .. } => "signer_mismatch",
            Self::DisclosureMismatch { .. } => "disclosure_mismatch",
            Self::MissingPrivateData { .. } => "missing_private_data",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::InvalidId { .. } => "invalid_id",
            Self::ExchangeIdMismatch { .. } => "exchange_id_mismatch",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::MissingExchangeId(_) => "missing_exchange_id",
            Self::Malformed(_) => "malformed",
            Self::OfferingRequirement(_) => "offering_requirement",
        }
    }

    /// Whether the document failed authentication (as opposed to parsing).
    pub fn is_authenticity_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptySignature
                | Self::SignatureVerification(_)
                | Self::SignerMismatch { .. }
                | Self::DisclosureMismatch { .. }
                | Self::MissingPrivateData { .. }
        )
    }
}
