//! # Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations. None of them is
//! transient: each indicates a malformed value or a programming error.

use thiserror::Error;

/// Top-level error type for `fxp-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An identifier (DID, document id) is malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp is malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A kind string does not name any known document kind.
    #[error("unknown kind: {0:?}")]
    UnknownKind(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and infinities have no JSON literal.
    #[error("non-finite number {0} cannot be represented in canonical form")]
    NonFiniteNumber(f64),

    /// The value could not be serialized (unsupported shape or a failing
    /// `Serialize` implementation).
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The canonical transform itself could not complete.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}
