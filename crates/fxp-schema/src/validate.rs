//! # Schema Validation
//!
//! Structural validation of wire documents against JSON Schema definitions
//! (Draft 2020-12).
//!
//! ## Security Invariant
//!
//! Schema validation is a trust boundary. Documents that fail validation
//! are rejected with structured error information: the instance path of
//! the violating field, the schema path of the failing rule, and a message.
//!
//! ## Schema Resolution
//!
//! All schemas use `$id` URIs of the form
//! `https://schemas.momentum-sez.org/fxp/<filename>`. Cross-schema `$ref`s
//! (`definitions.json#/$defs/...`) are resolved by a local retriever over
//! the loaded set; no network requests are ever made.
//!
//! ## Registry Lifecycle
//!
//! A [`SchemaRegistry`] is built once, explicitly, and passed by reference
//! to whatever needs it. Every `*.schema.json` is compiled at construction,
//! so validation never compiles and a broken schema fails startup rather
//! than the first document.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

/// URI prefix used by every schema `$id`.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.momentum-sez.org/fxp/";

/// Schemas compiled into the binary.
const EMBEDDED: &[(&str, &str)] = &[
    ("definitions.json", include_str!("../schemas/definitions.json")),
    ("message.schema.json", include_str!("../schemas/message.schema.json")),
    ("resource.schema.json", include_str!("../schemas/resource.schema.json")),
    ("rfq.schema.json", include_str!("../schemas/rfq.schema.json")),
    ("rfq-private.schema.json", include_str!("../schemas/rfq-private.schema.json")),
    ("quote.schema.json", include_str!("../schemas/quote.schema.json")),
    ("order.schema.json", include_str!("../schemas/order.schema.json")),
    (
        "orderinstructions.schema.json",
        include_str!("../schemas/orderinstructions.schema.json"),
    ),
    ("orderstatus.schema.json", include_str!("../schemas/orderstatus.schema.json")),
    ("cancel.schema.json", include_str!("../schemas/cancel.schema.json")),
    ("close.schema.json", include_str!("../schemas/close.schema.json")),
    ("offering.schema.json", include_str!("../schemas/offering.schema.json")),
    ("balance.schema.json", include_str!("../schemas/balance.schema.json")),
];

/// Local retriever that resolves `$ref` URIs to schemas held in memory.
struct LocalSchemaRetriever {
    /// Map from URI string to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        // Draft metaschemas ship with the validator; anything else is a
        // dangling reference.
        if uri_str.starts_with("https://json-schema.org/") {
            return Ok(serde_json::json!({}));
        }
        Err(format!("unresolvable schema reference: {uri_str}").into())
    }
}

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The requested schema is not in the registry.
    #[error("schema '{0}' is not registered")]
    UnknownSchema(String),

    /// A schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading a schema directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaValidationError {
    /// The violations, when this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {} [{}]", self.message, self.schema_path)
        } else {
            write!(f, "  {}: {} [{}]", self.instance_path, self.message, self.schema_path)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Validates instances against named schemas.
///
/// The dispatcher depends on this trait rather than on [`SchemaRegistry`]
/// directly, so callers may supply their own schema set.
pub trait SchemaCheck: Send + Sync {
    /// Validate `instance` against the schema registered as `schema_name`.
    fn check(&self, schema_name: &str, instance: &Value) -> Result<(), SchemaValidationError>;
}

/// Compiled validators for every registered schema.
///
/// `SchemaRegistry` is `Send + Sync` and read-only after construction.
pub struct SchemaRegistry {
    validators: HashMap<String, Validator>,
    origin: String,
}

impl SchemaRegistry {
    /// Build a registry from the schemas compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` or `ValidatorBuildError` if an embedded
    /// schema is broken.
    pub fn embedded() -> Result<Self, SchemaValidationError> {
        let mut schemas = HashMap::new();
        for (name, text) in EMBEDDED {
            schemas.insert((*name).to_string(), parse_schema(name, text)?);
        }
        Self::compile(schemas, "embedded".to_string())
    }

    /// Build a registry from every `*.json` file in `schema_dir`.
    ///
    /// Files named `*.schema.json` are compiled into validators; other
    /// JSON files are only available as `$ref` targets.
    pub fn from_dir(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref();
        let entries = std::fs::read_dir(schema_dir).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;

        let mut schemas = HashMap::new();
        for entry in entries {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.ends_with(".json") {
                    let content = std::fs::read_to_string(&path)?;
                    schemas.insert(name.to_string(), parse_schema(name, &content)?);
                }
            }
        }
        Self::compile(schemas, schema_dir.display().to_string())
    }

    fn compile(
        schemas: HashMap<String, Value>,
        origin: String,
    ) -> Result<Self, SchemaValidationError> {
        let opts = build_options(&schemas);
        let mut validators = HashMap::new();
        for (name, schema) in &schemas {
            if !name.ends_with(".schema.json") {
                continue;
            }
            let validator =
                opts.build(schema)
                    .map_err(|e| SchemaValidationError::ValidatorBuildError {
                        schema_name: name.clone(),
                        reason: e.to_string(),
                    })?;
            validators.insert(name.clone(), validator);
        }
        tracing::debug!(origin = %origin, count = validators.len(), "compiled schema registry");
        Ok(Self { validators, origin })
    }

    /// Where the schemas were loaded from (`embedded` or a directory).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether a schema with this name is registered.
    pub fn contains(&self, schema_name: &str) -> bool {
        self.validators.contains_key(schema_name)
    }

    /// Returns the names of all compiled schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.validators.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSchema` if the name is not registered and
    /// `ValidationFailed` with every violation if the instance is invalid.
    pub fn validate(&self, schema_name: &str, instance: &Value) -> Result<(), SchemaValidationError> {
        let validator = self
            .validators
            .get(schema_name)
            .ok_or_else(|| SchemaValidationError::UnknownSchema(schema_name.to_string()))?;
        collect_violations(validator, schema_name, instance)
    }
}

impl SchemaCheck for SchemaRegistry {
    fn check(&self, schema_name: &str, instance: &Value) -> Result<(), SchemaValidationError> {
        self.validate(schema_name, instance)
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("origin", &self.origin)
            .field("schemas", &self.schema_names())
            .finish()
    }
}

/// Validate `instance` against a schema supplied at runtime.
///
/// Used for schemas carried inside documents, such as an offering's
/// `requiredPaymentDetails`. `label` names the schema in errors.
pub fn validate_with_schema(
    schema: &Value,
    instance: &Value,
    label: &str,
) -> Result<(), SchemaValidationError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| SchemaValidationError::ValidatorBuildError {
            schema_name: label.to_string(),
            reason: e.to_string(),
        })?;
    collect_violations(&validator, label, instance)
}

fn collect_violations(
    validator: &Validator,
    schema_name: &str,
    instance: &Value,
) -> Result<(), SchemaValidationError> {
    let violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaValidationError::ValidationFailed {
            schema_name: schema_name.to_string(),
            violations: ValidationViolations { violations },
        })
    }
}

fn parse_schema(name: &str, text: &str) -> Result<Value, SchemaValidationError> {
    serde_json::from_str(text).map_err(|e| SchemaValidationError::SchemaLoadError {
        schema_name: name.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Options with a retriever over the loaded set, indexed by canonical URI,
/// by `$id` and by bare filename.
fn build_options(schemas: &HashMap<String, Value>) -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);

    let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
    for (filename, value) in schemas {
        schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());
        if let Some(id) = value.get("$id").and_then(|v| v.as_str()) {
            schemas_by_uri.insert(id.to_string(), value.clone());
        }
        schemas_by_uri.insert(filename.clone(), value.clone());
    }
    opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
    opts
}
