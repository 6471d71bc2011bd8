//! # modelkit-cli — Command-Line Interface
//!
//! Provides the `modelkit` binary for checking documents against schemas
//! without writing a model.
//!
//! ## Subcommands
//!
//! - `modelkit validate` checks JSON/YAML documents against a JSON Schema.
//! - `modelkit settings` prints the effective library settings.
//!
//! ```bash
//! modelkit validate --schema item.schema.json request.json
//! modelkit validate --schema item.schema.yaml --batch requests.yaml
//! MODELKIT_DISABLE_VALIDATION=1 modelkit settings
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return exit codes.
//! - Validation itself is delegated to `modelkit-schema`.

pub mod settings;
pub mod validate;
