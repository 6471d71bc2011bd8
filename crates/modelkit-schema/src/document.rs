//! # Document Loading
//!
//! Reads schema and data documents from disk for ad hoc validation.
//! The format is chosen from the file extension: `.yaml`/`.yml` are parsed
//! as YAML and converted to JSON values, everything else is parsed as JSON.

use std::path::Path;

use serde_json::Value;

use crate::validate::{SchemaError, SchemaType};

/// Load a JSON or YAML document as a JSON value.
///
/// # Errors
///
/// Returns `SchemaError::DocumentLoadError` if the file cannot be read,
/// parsed, or converted to JSON.
pub fn load_document(path: &Path) -> Result<Value, SchemaError> {
    let load_error = |reason: String| SchemaError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| load_error(format!("cannot read file: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        "yaml" | "yml" => {
            let yaml_value: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            yaml_to_json_value(&yaml_value)
                .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}

/// Load and compile a schema document from disk.
///
/// The schema is named after the file name.
pub fn load_schema(path: &Path) -> Result<SchemaType<Value>, SchemaError> {
    let document = load_document(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("schema")
        .to_string();
    SchemaType::from_document(name, document)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Only the JSON-compatible subset of YAML is accepted: map keys must be
/// scalars and floats must be finite. Tags are dropped.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => json_number(n)?,
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => {
            Value::Array(seq.iter().map(yaml_to_json_value).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((json_key(k)?, yaml_to_json_value(v)?)))
                .collect::<Result<_, String>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

fn json_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("cannot represent {n} in JSON"))
}

/// Scalar YAML keys become their string form.
fn json_key(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported YAML map key: {other:?}")),
    }
}
