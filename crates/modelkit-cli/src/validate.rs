//! # Validate Subcommand
//!
//! Checks JSON/YAML documents against a JSON Schema document outside any
//! model. Failures are reported as [`DataValidationError`]s, so the output
//! is bounded exactly like errors raised at the prediction boundary.
//!
//! With `--batch`, each document must be a sequence and is checked item by
//! item, stopping at the first invalid item.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use modelkit_core::{DataValidationError, LibrarySettings, ValidationFailure, Violation};
use modelkit_schema::{load_document, load_schema, SchemaType};

/// Arguments for the `modelkit validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON Schema document (JSON or YAML) to validate against.
    #[arg(long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Treat every document as a sequence of items.
    #[arg(long)]
    pub batch: bool,

    /// Documents to validate.
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if every document passed (or validation is
/// disabled), 1 if any failed.
pub fn run_validate(args: &ValidateArgs, settings: &LibrarySettings) -> Result<u8> {
    if settings.disable_validation {
        tracing::warn!("validation disabled; documents are not checked");
        for path in &args.documents {
            println!("SKIP: {}", path.display());
        }
        return Ok(0);
    }

    let schema = load_schema(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    tracing::info!(schema = %schema.name(), documents = args.documents.len(), "loaded schema");

    let mut had_failures = false;
    for path in &args.documents {
        had_failures |= report(&schema, path, args.batch)?;
    }

    Ok(u8::from(had_failures))
}

/// Validate one document file and print its outcome. Returns true on failure.
fn report(schema: &SchemaType<Value>, path: &Path, batch: bool) -> Result<bool> {
    let document = load_document(path)
        .with_context(|| format!("failed to load document {}", path.display()))?;

    match check_document(schema, document, batch) {
        Ok(()) => {
            println!("OK: {}", path.display());
            Ok(false)
        }
        Err(e) => {
            println!("FAIL: {}\n{e}", path.display());
            Ok(true)
        }
    }
}

/// Check `document` against `schema`, as a single item or as a batch.
///
/// # Errors
///
/// Returns a `DataValidationError` naming the schema. In batch mode the
/// error carries the position of the first invalid item.
pub fn check_document(
    schema: &SchemaType<Value>,
    document: Value,
    batch: bool,
) -> Result<(), DataValidationError> {
    if !batch {
        return schema
            .check(&document)
            .map_err(|failure| DataValidationError::new(schema.name(), failure));
    }

    let items = match document {
        Value::Array(items) => items,
        other => {
            let failure = ValidationFailure::new(
                schema.name(),
                vec![Violation::at_root("expected a sequence of items", other)],
            );
            return Err(DataValidationError::new(schema.name(), failure));
        }
    };

    for (i, item) in items.iter().enumerate() {
        if let Err(failure) = schema.check(item) {
            tracing::debug!(index = i, violations = failure.violations().len(), "batch item failed");
            return Err(DataValidationError::new(schema.name(), failure.at_index(i)));
        }
    }
    Ok(())
}
