//! # fxp-schema — Schema Validation Collaborator
//!
//! Structural validation of wire documents. Ships one JSON Schema per
//! document kind plus the message and resource envelopes, compiled into a
//! [`SchemaRegistry`] handle that is built once and passed by reference.
//!
//! The message layer validates through the [`SchemaCheck`] trait and owns
//! the kind → schema-name mapping; this crate owns compilation and rule
//! evaluation.
//!
//! ## Crate Policy
//!
//! - Depends on no other `fxp-*` crate.
//! - Schema `$id` and `$ref` URIs must never be changed without verifying
//!   all references across the schema set.
//! - Schema validation is a trust boundary: invalid documents are rejected
//!   with structured errors including instance path and schema path.

pub mod validate;

pub use validate::{
    validate_with_schema, SchemaCheck, SchemaRegistry, SchemaValidationError, ValidationViolations,
    Violation, SCHEMA_URI_PREFIX,
};
