//! # Library Settings
//!
//! Process-level switches read by model handles at construction time.
//!
//! ## Configuration
//!
//! ```text
//! MODELKIT_DISABLE_VALIDATION=true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable controlling [`LibrarySettings::disable_validation`].
pub const DISABLE_VALIDATION_ENV: &str = "MODELKIT_DISABLE_VALIDATION";

/// Error reading settings from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A boolean flag had an unrecognized value.
    #[error("invalid boolean for {key}: {value:?} (expected one of 1/0, true/false, yes/no, on/off)")]
    InvalidFlag {
        /// Environment key.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Settings shared by every model handle built from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// When set, item and return values are never validated.
    pub disable_validation: bool,
}

impl LibrarySettings {
    /// Settings with validation enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for `disable_validation`.
    pub fn with_disable_validation(mut self, disable: bool) -> Self {
        self.disable_validation = disable;
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup. Missing keys keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        if let Some(raw) = lookup(DISABLE_VALIDATION_ENV) {
            settings.disable_validation = parse_flag(DISABLE_VALIDATION_ENV, &raw)?;
        }
        Ok(settings)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_with(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| (key == DISABLE_VALIDATION_ENV).then(|| value.to_string())
    }

    #[test]
    fn defaults_enable_validation() {
        assert!(!LibrarySettings::new().disable_validation);
        let s = LibrarySettings::from_lookup(|_| None).unwrap();
        assert_eq!(s, LibrarySettings::default());
    }

    #[test]
    fn builder_sets_flag() {
        assert!(LibrarySettings::new().with_disable_validation(true).disable_validation);
    }

    #[test]
    fn truthy_values_disable_validation() {
        for v in ["1", "true", "TRUE", "yes", " on "] {
            let s = LibrarySettings::from_lookup(lookup_with(v)).unwrap();
            assert!(s.disable_validation, "{v:?} should disable validation");
        }
    }

    #[test]
    fn falsy_values_keep_validation() {
        for v in ["0", "false", "No", "off", ""] {
            let s = LibrarySettings::from_lookup(lookup_with(v)).unwrap();
            assert!(!s.disable_validation, "{v:?} should keep validation");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let err = LibrarySettings::from_lookup(lookup_with("maybe")).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidFlag { .. }));
        assert!(err.to_string().contains(DISABLE_VALIDATION_ENV));
    }

    #[test]
    fn deserializes_with_defaults() {
        let s: LibrarySettings = serde_json::from_str("{}").unwrap();
        assert!(!s.disable_validation);
        let s: LibrarySettings = serde_json::from_str(r#"{"disable_validation": true}"#).unwrap();
        assert!(s.disable_validation);
    }
}
