//! # fxp-core — Foundational Types for the Exchange Protocol
//!
//! This crate defines the primitives every other `fxp-*` crate builds on:
//! canonical serialization, content digests, timestamps, identifiers and
//! document kinds. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()` (RFC 8785 JCS). No raw `serde_json::to_vec()`
//!    for digests.
//!
//! 2. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that all digest paths flow through canonicalization.
//!
//! 3. **Newtype identifiers.** `Did` and `DocumentId` are validated at
//!    construction and on deserialization.
//!
//! 4. **UTC-only timestamps.** `Timestamp` accepts only the `Z` suffix and
//!    preserves its wire text so signed digests survive a round trip.
//!
//! 5. **Closed kind sets.** `MessageKind` and `ResourceKind` are exhaustive
//!    enums; adding a kind forces every `match` to handle it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fxp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod kind;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{digest_of, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CoreError};
pub use identity::{Did, DocumentId};
pub use kind::{MessageKind, ResourceKind};
pub use temporal::Timestamp;

/// Protocol version stamped on documents when none is given.
pub const DEFAULT_PROTOCOL: &str = "1.0";
