//! # Schema Types
//!
//! A [`SchemaType<T>`] is a JSON Schema compiled once for a Rust type `T`.
//! It can check a raw JSON value (collecting every violation) and construct
//! a `T` from it, applying the type's serde defaults for omitted fields.
//!
//! ## Schema Sources
//!
//! - [`SchemaType::derive`] generates the schema from `T`'s `JsonSchema`
//!   implementation (draft-07, as emitted by `schemars`).
//! - [`SchemaType::from_document`] compiles a hand-written schema document.
//!   The draft is taken from the document's `$schema` keyword.
//!
//! ## Unconstrained Schemas
//!
//! A schema with no assertions (only annotations such as `title`) accepts
//! every value. No validator is compiled for it, and callers can detect it
//! with [`SchemaType::is_unconstrained`] to skip validation entirely.
//!
//! ## Reference Resolution
//!
//! Only local `$ref`s (`#/definitions/...`) are supported. Remote URIs are
//! refused at compile time, so building a validator never touches the network.

use std::fmt;
use std::marker::PhantomData;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use modelkit_core::{ValidationFailure, Violation};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Keywords that annotate a schema without constraining instances.
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "definitions",
    "$defs",
    "examples",
    "default",
];

/// Types whose values can cross a validated boundary.
///
/// Implemented for every `JsonSchema + DeserializeOwned` type.
/// `serde_json::Value` is the universal "any" type: its schema is
/// unconstrained.
pub trait Schema: JsonSchema + DeserializeOwned + Send + Sync + 'static {}

impl<T> Schema for T where T: JsonSchema + DeserializeOwned + Send + Sync + 'static {}

/// Error building a [`SchemaType`] or loading a schema/document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The generated schema could not be turned into a JSON document.
    #[error("schema generation failed for '{schema_name}': {reason}")]
    Generate {
        /// Name of the Rust type.
        schema_name: String,
        /// Underlying serializer message.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema name.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// A schema or document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the file that failed to load.
        path: String,
        /// Reason the file could not be loaded.
        reason: String,
    },
}

/// Refuses every `$ref` that is not local to the schema document.
struct LocalOnlyRetriever;

impl Retrieve for LocalOnlyRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("remote schema references are not supported: {}", uri.as_str()).into())
    }
}

/// A JSON Schema compiled for values of type `T`.
///
/// `SchemaType` is `Send + Sync` and meant to be built once and shared.
pub struct SchemaType<T> {
    name: String,
    document: Value,
    validator: Option<Validator>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Schema> SchemaType<T> {
    /// Generate and compile the schema of `T`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuildError` if the generated schema
    /// does not compile.
    pub fn derive() -> Result<Self, SchemaError> {
        let name = T::schema_name();
        let root = schemars::schema_for!(T);
        let document = serde_json::to_value(&root).map_err(|e| SchemaError::Generate {
            schema_name: name.clone(),
            reason: e.to_string(),
        })?;
        Self::from_document(name, document)
    }
}

impl<T> SchemaType<T> {
    /// Compile a hand-written schema document for `T`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidatorBuildError` if the document is not a
    /// valid schema or references a remote schema.
    pub fn from_document(name: impl Into<String>, document: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = if is_unconstrained(&document) {
            None
        } else {
            let opts = build_options();
            Some(opts.build(&document).map_err(|e| SchemaError::ValidatorBuildError {
                schema_name: name.clone(),
                reason: e.to_string(),
            })?)
        };
        Ok(Self {
            name,
            document,
            validator,
            _marker: PhantomData,
        })
    }

    /// Name of the schema, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// True if the schema accepts every value.
    pub fn is_unconstrained(&self) -> bool {
        self.validator.is_none()
    }

    /// Check `value` against the schema, collecting every violation.
    pub fn check(&self, value: &Value) -> Result<(), ValidationFailure> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };

        let violations: Vec<Violation> = validator
            .iter_errors(value)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
                offered: e.instance.clone().into_owned(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure::new(self.name.clone(), violations))
        }
    }
}

impl<T: DeserializeOwned> SchemaType<T> {
    /// Check `value` and construct a `T` from it.
    ///
    /// Omitted optional fields take the defaults declared on `T`.
    ///
    /// # Errors
    ///
    /// Returns the full `ValidationFailure` if the value violates the
    /// schema or cannot be deserialized into `T`.
    pub fn construct(&self, value: Value) -> Result<T, ValidationFailure> {
        self.check(&value)?;
        T::deserialize(&value).map_err(|e| {
            ValidationFailure::new(
                self.name.clone(),
                vec![Violation::at_root(e.to_string(), value.clone())],
            )
        })
    }
}

impl<T> fmt::Debug for SchemaType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaType")
            .field("name", &self.name)
            .field("unconstrained", &self.validator.is_none())
            .finish()
    }
}

/// True if `document` carries no assertions and so accepts every value.
pub fn is_unconstrained(document: &Value) -> bool {
    match document {
        Value::Bool(accept) => *accept,
        Value::Object(map) => map
            .keys()
            .all(|k| ANNOTATION_KEYWORDS.contains(&k.as_str())),
        _ => false,
    }
}

fn build_options() -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_retriever(LocalOnlyRetriever);
    opts
}
