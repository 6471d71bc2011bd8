//! # Structured Validation Failures
//!
//! The records produced when a value does not satisfy a declared type.
//! A [`ValidationFailure`] is the full, untruncated diagnostic. It is kept
//! as the `source()` of every domain validation error so callers can
//! inspect each [`Violation`] programmatically.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the offered value.
    pub instance_path: String,
    /// JSON Pointer path within the schema naming the constraint that failed.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// The offending value as it was offered.
    pub offered: Value,
}

impl Violation {
    /// A violation attached to the root of the offered value.
    pub fn at_root(message: impl Into<String>, offered: Value) -> Self {
        Self {
            instance_path: String::new(),
            schema_path: String::new(),
            message: message.into(),
            offered,
        }
    }

    /// The schema keyword that rejected the value (`type`, `required`, ...).
    pub fn keyword(&self) -> &str {
        self.schema_path.rsplit('/').next().unwrap_or("")
    }

    /// Prefix the instance path with a batch position.
    fn nest_under(&mut self, index: usize) {
        self.instance_path = format!("/{index}{}", self.instance_path);
    }
}

/// Maximum number of characters rendered for one violation's path and message.
///
/// Messages from the schema engine quote the offending value, which may be
/// arbitrarily large. The full value stays available in [`Violation::offered`].
pub const MAX_RENDERED_VIOLATION_CHARS: usize = 200;

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        let path = truncated(path, MAX_RENDERED_VIOLATION_CHARS);
        let budget = MAX_RENDERED_VIOLATION_CHARS.saturating_sub(path.chars().count());
        write!(f, "  {path}: {}", truncated(&self.message, budget))
    }
}

/// `text` cut to at most `max` characters, marked with `...` when cut.
fn truncated(text: &str, max: usize) -> std::borrow::Cow<'_, str> {
    match text.char_indices().nth(max) {
        None => text.into(),
        Some((end, _)) => format!("{}...", &text[..end]).into(),
    }
}

/// Violations in the order the schema engine reported them.
///
/// Derefs to a slice, so `len`, `is_empty` and `iter` come for free.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationViolations(Vec<Violation>);

impl ValidationViolations {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}

impl std::ops::Deref for ValidationViolations {
    type Target = [Violation];

    fn deref(&self) -> &[Violation] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ValidationViolations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Violation>> for ValidationViolations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl FromIterator<Violation> for ValidationViolations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One rendered violation per line.
impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.iter();
        if let Some(first) = lines.next() {
            write!(f, "{first}")?;
        }
        lines.try_for_each(|v| write!(f, "\n{v}"))
    }
}

/// A value failed validation against a declared type.
///
/// This is the underlying error wrapped by every domain validation error.
/// Its `Display` lists every violation; the domain errors only show a
/// bounded prefix.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{count} validation error(s) for {type_name}{position}:\n{violations}",
    count = .violations.len(),
    position = batch_position(.index))]
pub struct ValidationFailure {
    type_name: String,
    violations: ValidationViolations,
    index: Option<usize>,
}

impl ValidationFailure {
    /// Create a failure for `type_name` with the given violations.
    pub fn new(type_name: impl Into<String>, violations: impl Into<ValidationViolations>) -> Self {
        Self {
            type_name: type_name.into(),
            violations: violations.into(),
            index: None,
        }
    }

    /// Attribute this failure to position `index` of a batch.
    ///
    /// Instance paths are prefixed with the index so they point into the
    /// batch as a whole.
    pub fn at_index(mut self, index: usize) -> Self {
        if self.index.is_none() {
            for v in &mut self.violations.0 {
                v.nest_under(index);
            }
            self.index = Some(index);
        }
        self
    }

    /// Name of the declared type the value was checked against.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All violations, untruncated.
    pub fn violations(&self) -> &ValidationViolations {
        &self.violations
    }

    /// Batch position of the offending element, if any.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

fn batch_position(index: &Option<usize>) -> String {
    index.map(|i| format!(" at batch index {i}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_violation(path: &str) -> Violation {
        Violation {
            instance_path: path.to_string(),
            schema_path: "/properties/x/type".to_string(),
            message: r#""bad" is not of type "integer""#.to_string(),
            offered: json!("bad"),
        }
    }

    #[test]
    fn violation_display_format() {
        let display = type_violation("/x").to_string();
        assert!(display.contains("/x"));
        assert!(display.contains("is not of type"));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation::at_root(r#""x" is a required property"#, json!({}));
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn keyword_is_last_schema_path_segment() {
        assert_eq!(type_violation("/x").keyword(), "type");
        assert_eq!(Violation::at_root("m", Value::Null).keyword(), "");
    }

    #[test]
    fn rendering_is_bounded_for_large_offered_values() {
        let offered = Value::Array((0..100_000).map(Value::from).collect());
        let v = Violation {
            instance_path: "/x".to_string(),
            schema_path: "/properties/x/type".to_string(),
            message: format!("{offered} is not of type \"integer\""),
            offered: offered.clone(),
        };
        let rendered = v.to_string();
        assert!(rendered.chars().count() <= MAX_RENDERED_VIOLATION_CHARS + 8);
        assert!(rendered.starts_with("  /x: [0,1,2,"));
        assert!(rendered.ends_with("..."));
        assert_eq!(v.offered, offered);
    }

    #[test]
    fn short_messages_are_rendered_whole() {
        let v = type_violation("/x");
        assert_eq!(v.to_string(), format!("  /x: {}", v.message));
        assert_eq!(truncated("héllo", 2), "hé...");
        assert_eq!(truncated("héllo", 5), "héllo");
    }

    #[test]
    fn failure_lists_every_violation() {
        let failure = ValidationFailure::new(
            "ItemModel",
            vec![type_violation("/a"), type_violation("/b")],
        );
        let text = failure.to_string();
        assert!(text.starts_with("2 validation error(s) for ItemModel:"));
        assert!(text.contains("/a"));
        assert!(text.contains("/b"));
    }

    #[test]
    fn at_index_prefixes_paths_once() {
        let failure = ValidationFailure::new("ItemModel", vec![type_violation("/x")])
            .at_index(2)
            .at_index(5);
        assert_eq!(failure.index(), Some(2));
        assert_eq!(failure.violations().violations()[0].instance_path, "/2/x");
        assert!(failure.to_string().contains("at batch index 2"));
    }

    #[test]
    fn collect_into_violations() {
        let collected: ValidationViolations =
            (0..3).map(|i| type_violation(&format!("/{i}"))).collect();
        assert_eq!(collected.len(), 3);
        assert!(!collected.is_empty());
        assert_eq!(collected.into_inner().len(), 3);
    }

    #[test]
    fn violations_render_one_per_line_and_serialize_as_a_list() {
        let violations: ValidationViolations =
            vec![type_violation("/a"), type_violation("/b")].into();
        let text = violations.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("  /a: ") && !text.ends_with('\n'));
        assert_eq!(ValidationViolations::default().to_string(), "");
        assert_eq!(serde_json::to_value(&violations).unwrap().as_array().map(Vec::len), Some(2));
        assert_eq!((&violations).into_iter().count(), 2);
    }
}
