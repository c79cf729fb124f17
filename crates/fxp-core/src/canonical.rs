//! # Canonical Serialization — JCS Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that are digested or signed anywhere in the protocol.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through [`CanonicalBytes::new()`] (or
//! [`CanonicalBytes::from_value()`]), which serializes through `serde_jcs`
//! for RFC 8785 (JSON Canonicalization Scheme) output:
//!
//! 1. Object keys sorted at every nesting level, independent of struct
//!    field declaration order or map insertion order.
//! 2. No insignificant whitespace.
//! 3. Numbers in the ECMAScript shortest round-trip form; strings with the
//!    minimal JSON escape set.
//!
//! `serde_json` quietly writes non-finite floats as `null`, which would let
//! two different values share a digest. A probe pass walks the value first
//! and rejects NaN and infinities before any bytes are produced.
//!
//! Any function that digests a document must accept `&CanonicalBytes`, so
//! the "digest over non-canonical bytes" defect cannot be written.
//!
//! ## Wire Form vs Canonical Form
//!
//! Canonical bytes are internal only. Documents travel as ordinary JSON;
//! the canonical form exists solely as digest input.

use serde::ser::{self, Serialize, Serializer};
use serde_json::error::Category;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructors are `CanonicalBytes::new()` and
///   `CanonicalBytes::from_value()`.
/// - The content is valid UTF-8 JSON with sorted keys and compact separators.
/// - Non-finite numbers are never present (they are rejected at construction,
///   not rewritten to `null`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// The value is serialized directly through the JCS formatter, so values
    /// that JSON cannot represent (NaN, infinities, maps with non-string
    /// keys) fail instead of being silently coerced to `null`.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NonFiniteNumber` for NaN or infinite
    /// floats and `CanonicalizationError::Serialization` for any other value
    /// with no canonical JSON representation. Returns
    /// `CanonicalizationError::Canonicalization` if the JCS transform itself
    /// produced unusable output.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        obj.serialize(FiniteProbe).map_err(|e| match e {
            ProbeError::NonFinite(v) => CanonicalizationError::NonFiniteNumber(v),
            ProbeError::Custom(msg) => {
                CanonicalizationError::Serialization(<serde_json::Error as ser::Error>::custom(msg))
            }
        })?;
        let bytes = serde_jcs::to_vec(obj).map_err(classify)?;
        if let Err(e) = std::str::from_utf8(&bytes) {
            return Err(CanonicalizationError::Canonicalization(format!(
                "canonical output is not UTF-8: {e}"
            )));
        }
        Ok(Self(bytes))
    }

    /// Construct canonical bytes from an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, CanonicalizationError> {
        Self::new(value)
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as a string slice.
    pub fn as_str(&self) -> &str {
        // Validated as UTF-8 at construction.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Map a serializer failure onto the canonicalization error taxonomy.
///
/// Unsupported shapes (non-string map keys, failing `Serialize` impls)
/// surface as data or I/O category errors and mean the value has no
/// canonical representation.
fn classify(err: serde_json::Error) -> CanonicalizationError {
    match err.classify() {
        Category::Io | Category::Data => CanonicalizationError::Serialization(err),
        Category::Syntax | Category::Eof => {
            CanonicalizationError::Canonicalization(err.to_string())
        }
    }
}

// ─── Non-finite probe ────────────────────────────────────────────────

#[derive(Debug)]
enum ProbeError {
    NonFinite(f64),
    Custom(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite(v) => write!(f, "non-finite number {v}"),
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ProbeError {}

impl ser::Error for ProbeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// A serializer that produces nothing and fails on the first non-finite float.
#[derive(Clone, Copy)]
struct FiniteProbe;

fn check_finite(v: f64) -> Result<(), ProbeError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ProbeError::NonFinite(v))
    }
}

impl Serializer for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i8(self, _: i8) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i16(self, _: i16) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i32(self, _: i32) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_i64(self, _: i64) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u8(self, _: u8) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u16(self, _: u16) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u32(self, _: u32) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_u64(self, _: u64) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_f32(self, v: f32) -> Result<(), ProbeError> {
        check_finite(f64::from(v))
    }
    fn serialize_f64(self, v: f64) -> Result<(), ProbeError> {
        check_finite(v)
    }
    fn serialize_char(self, _: char) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_str(self, _: &str) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_none(self) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), ProbeError> {
        Ok(())
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(self)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple(self, _: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, ProbeError> {
        Ok(self)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, ProbeError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), ProbeError> {
        key.serialize(FiniteProbe)
    }
    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteProbe {
    type Ok = ();
    type Error = ProbeError;
    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), ProbeError> {
        value.serialize(FiniteProbe)
    }
    fn end(self) -> Result<(), ProbeError> {
        Ok(())
    }
}
