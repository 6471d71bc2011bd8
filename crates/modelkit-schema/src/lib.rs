//! # modelkit-schema — Schema Capability
//!
//! The schema engine behind the validated prediction boundary. It answers
//! one question: "does this raw value satisfy this declared type, and if
//! so, what is the typed value?"
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SchemaType<T>`] compiles a JSON Schema once, either derived from `T`
//! with `schemars` or supplied as a document, and then:
//!
//! - [`SchemaType::check`] collects every violation with `jsonschema`,
//! - [`SchemaType::construct`] checks and then builds a `T` with `serde`,
//!   applying declared defaults.
//!
//! ## Documents (`document`)
//!
//! Loading JSON/YAML schema and data files for ad hoc checks.
//!
//! ## Crate Policy
//!
//! - Depends only on `modelkit-core` internally.
//! - Violations carry instance path, schema path, message and the offered
//!   value; truncation is the caller's concern.

pub mod document;
pub mod validate;

pub use document::{load_document, load_schema, yaml_to_json_value};
pub use validate::{is_unconstrained, Schema, SchemaError, SchemaType};
