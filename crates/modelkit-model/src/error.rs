//! Errors returned by model calls.

use modelkit_core::{
    BoundaryValidationError, DataValidationError, ItemValidationError, ReturnValueValidationError,
};
use thiserror::Error;

/// Error from a call through a model handle.
///
/// Validation errors are raised by the boundary. `Predict` carries the
/// prediction function's own error exactly as it was returned.
#[derive(Error, Debug)]
pub enum ModelError<E> {
    /// The input failed validation against the item type.
    #[error(transparent)]
    ItemValidation(ItemValidationError),

    /// The prediction output failed validation against the return type.
    #[error(transparent)]
    ReturnValueValidation(ReturnValueValidationError),

    /// The prediction function failed.
    #[error(transparent)]
    Predict(E),
}

impl<E> ModelError<E> {
    /// The validation error, if this is one.
    pub fn validation(&self) -> Option<&DataValidationError> {
        match self {
            Self::ItemValidation(e) => Some(&**e),
            Self::ReturnValueValidation(e) => Some(&**e),
            Self::Predict(_) => None,
        }
    }

    /// True if the input was rejected.
    pub fn is_item_validation(&self) -> bool {
        matches!(self, Self::ItemValidation(_))
    }

    /// True if the output was rejected.
    pub fn is_return_value_validation(&self) -> bool {
        matches!(self, Self::ReturnValueValidation(_))
    }

    /// Take the prediction function's error, if this is one.
    pub fn into_predict(self) -> Option<E> {
        match self {
            Self::Predict(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<BoundaryValidationError> for ModelError<E> {
    fn from(err: BoundaryValidationError) -> Self {
        match err {
            BoundaryValidationError::Item(e) => Self::ItemValidation(e),
            BoundaryValidationError::ReturnValue(e) => Self::ReturnValueValidation(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::{ValidationFailure, ValidationRole, Violation};
    use serde_json::json;

    #[derive(Error, Debug, PartialEq)]
    #[error("model exploded")]
    struct Boom;

    fn failure() -> ValidationFailure {
        ValidationFailure::new("T", vec![Violation::at_root("bad", json!(1))])
    }

    #[test]
    fn boundary_errors_map_to_variants() {
        let err: ModelError<Boom> =
            BoundaryValidationError::wrap("m", failure(), ValidationRole::Item).into();
        assert!(err.is_item_validation());
        assert_eq!(err.validation().and_then(|e| e.role()), Some(ValidationRole::Item));

        let err: ModelError<Boom> =
            BoundaryValidationError::wrap("m", failure(), ValidationRole::ReturnValue).into();
        assert!(err.is_return_value_validation());
    }

    #[test]
    fn predict_error_is_passed_through() {
        let err = ModelError::Predict(Boom);
        assert_eq!(err.to_string(), "model exploded");
        assert!(err.validation().is_none());
        assert_eq!(err.into_predict(), Some(Boom));
    }
}
