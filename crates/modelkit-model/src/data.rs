//! Values crossing the prediction boundary.

use serde::Serialize;
use serde_json::Value;

/// A value handed to or returned from a prediction function.
///
/// `Typed` holds an already-constructed instance of the declared type and
/// is passed through validation untouched. `Raw` holds an untyped JSON
/// value which validation either constructs into the declared type or
/// rejects. When validation is skipped for a role, `Raw` values reach the
/// other side as they were.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data<T> {
    /// An instance of the declared type.
    Typed(T),
    /// An untyped value.
    Raw(Value),
}

impl<T> Data<T> {
    /// Wrap an untyped value.
    pub fn raw(value: Value) -> Self {
        Self::Raw(value)
    }

    /// True if this is a `Typed` value.
    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    /// Borrow the typed value, if any.
    pub fn as_typed(&self) -> Option<&T> {
        match self {
            Self::Typed(t) => Some(t),
            Self::Raw(_) => None,
        }
    }

    /// Borrow the raw value, if any.
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Typed(_) => None,
            Self::Raw(v) => Some(v),
        }
    }

    /// Take the typed value, if any.
    pub fn into_typed(self) -> Option<T> {
        match self {
            Self::Typed(t) => Some(t),
            Self::Raw(_) => None,
        }
    }

    /// Take the raw value, if any.
    pub fn into_raw(self) -> Option<Value> {
        match self {
            Self::Typed(_) => None,
            Self::Raw(v) => Some(v),
        }
    }

    /// Transform the typed value, leaving raw values alone.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Data<U> {
        match self {
            Self::Typed(t) => Data::Typed(f(t)),
            Self::Raw(v) => Data::Raw(v),
        }
    }
}

impl<T: Serialize> Data<T> {
    /// Render either variant as a JSON value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<T> From<T> for Data<T> {
    fn from(value: T) -> Self {
        Self::Typed(value)
    }
}
