//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, the type of `createdAt`, `updatedAt` and
//! `expiresAt`.
//!
//! ## Security Invariant
//!
//! A document's signature covers the exact text of its timestamps. A
//! timestamp therefore remembers the RFC 3339 text it was parsed from and
//! writes that same text back out, so that decode → re-serialize → digest
//! reproduces the signer's digest even when the counterparty used a
//! different fractional-second precision.
//!
//! Non-UTC inputs are **rejected** by [`Timestamp::parse()`]; only the `Z`
//! suffix is accepted on the wire.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A UTC timestamp with its RFC 3339 wire text.
///
/// Equality, ordering and hashing consider only the instant.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated to seconds.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncated to seconds.
/// - [`Timestamp::parse()`] — from a `Z`-suffixed RFC 3339 string, text kept verbatim.
#[derive(Debug, Clone)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    text: String,
}

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        let instant = dt.with_nanosecond(0).unwrap_or(dt);
        Self {
            text: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            instant,
        }
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only timestamps with the `Z` suffix are accepted; explicit offsets,
    /// including `+00:00`, are rejected. Fractional seconds are preserved.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self {
            instant: dt.with_timezone(&Utc),
            text: s.to_string(),
        })
    }

    /// Returns the timestamp `delta` after this one, truncated to seconds.
    pub fn plus(&self, delta: Duration) -> Self {
        Self::from_utc(self.instant + delta)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.instant
    }

    /// The RFC 3339 text this timestamp serializes as.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether this instant lies strictly before `other`.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.instant < other.instant
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
