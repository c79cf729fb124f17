//! # Identity Newtypes
//!
//! Newtype wrappers for the two identifier namespaces carried in document
//! metadata: party identities (`from`, `to`) and document identifiers
//! (`id`, `exchangeId`).
//!
//! ## Security Invariant
//!
//! Type-level distinction between the namespaces prevents a document id
//! from being accepted where a party identity is expected. Both types are
//! validated at construction and on deserialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Deserialize through the validating constructor.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ─── Decentralized Identifier ────────────────────────────────────────

/// A Decentralized Identifier URI (`did:<method>:<method-specific-id>`).
///
/// The method must be non-empty lowercase alphanumeric and the
/// method-specific id must be non-empty. Resolution of the identifier to
/// key material happens in the signing layer, never here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Did(String);

impl_validating_deserialize!(Did);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] if the string does not match
    /// the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let s = value.into();
        match split_did(&s) {
            Some(_) => Ok(Self(s)),
            None => Err(CoreError::InvalidIdentifier(format!("not a DID: {s:?}"))),
        }
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The DID method (`jwk` in `did:jwk:...`).
    pub fn method(&self) -> &str {
        split_did(&self.0).map(|(m, _)| m).unwrap_or_default()
    }

    /// Everything after `did:<method>:`.
    pub fn method_specific_id(&self) -> &str {
        split_did(&self.0).map(|(_, id)| id).unwrap_or_default()
    }
}

fn split_did(s: &str) -> Option<(&str, &str)> {
    let rest = s.strip_prefix("did:")?;
    let (method, id) = rest.split_once(':')?;
    let method_ok = !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !method_ok || id.is_empty() {
        return None;
    }
    Some((method, id))
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Document Identifier ─────────────────────────────────────────────

/// A document identifier of the form `<kind>_<suffix>`.
///
/// Freshly generated ids use a time-ordered UUIDv7 suffix, so ids sort by
/// creation time. Ids received from peers are accepted with any non-empty
/// suffix; whether the prefix matches the document's kind is checked where
/// the kind is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl_validating_deserialize!(DocumentId);

impl DocumentId {
    /// Generate a fresh id for a document of `kind`.
    pub fn generate(kind: &str) -> Self {
        Self(format!("{kind}_{}", Uuid::now_v7().simple()))
    }

    /// Wrap an existing id string, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] when the string has no
    /// `_` separator or an empty prefix or suffix.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let s = value.into();
        match s.split_once('_') {
            Some((prefix, suffix)) if !prefix.is_empty() && !suffix.is_empty() => Ok(Self(s)),
            _ => Err(CoreError::InvalidIdentifier(format!(
                "document id must look like <kind>_<suffix>, got {s:?}"
            ))),
        }
    }

    /// The kind prefix (everything before the first `_`).
    pub fn prefix(&self) -> &str {
        self.0.split_once('_').map(|(p, _)| p).unwrap_or_default()
    }

    /// Whether this id was minted for a document of `kind`.
    pub fn has_kind(&self, kind: &str) -> bool {
        self.prefix() == kind
    }

    /// Access the id string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
