//! # Validation Error Kinds
//!
//! Maps an underlying [`ValidationFailure`] into the domain error a caller
//! sees. There are three kinds:
//!
//! - [`DataValidationError`]: the base kind. Raised directly by ad hoc
//!   schema checks outside the item/return framing.
//! - [`ItemValidationError`]: an input failed its item schema.
//! - [`ReturnValueValidationError`]: a prediction produced output that
//!   failed its return schema.
//!
//! Both role kinds deref to and convert into the base kind, so code that
//! does not care about the role can handle them uniformly.
//!
//! ## Message Size
//!
//! The rendered message shows at most [`MAX_REPORTED_VIOLATIONS`]
//! violations followed by a count of the omitted remainder. The full
//! failure stays reachable through [`DataValidationError::failure`] and
//! `source()`.

use std::fmt;
use std::ops::Deref;

use thiserror::Error;

use crate::violation::ValidationFailure;

/// Maximum number of violations rendered into a validation error message.
pub const MAX_REPORTED_VIOLATIONS: usize = 10;

/// Which side of the prediction boundary a value was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRole {
    /// Input to the prediction function.
    Item,
    /// Output of the prediction function.
    ReturnValue,
}

impl ValidationRole {
    fn context(self) -> &'static str {
        match self {
            Self::Item => "Item validation error in model",
            Self::ReturnValue => "Return value validation error in model",
        }
    }
}

impl fmt::Display for ValidationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item => write!(f, "item"),
            Self::ReturnValue => write!(f, "return value"),
        }
    }
}

/// Render the first `cap` violations of `failure`, one per line, plus a
/// remainder line when some were omitted.
pub fn summarize(failure: &ValidationFailure, cap: usize) -> String {
    let violations = failure.violations().violations();
    let mut lines: Vec<String> = violations.iter().take(cap).map(|v| v.to_string()).collect();
    if violations.len() > cap {
        lines.push(format!("  ... and {} more violation(s)", violations.len() - cap));
    }
    lines.join("\n")
}

/// Base validation error kind.
#[derive(Error, Debug, Clone)]
#[error("{context} `{model}`{position}:\n{summary}",
    position = batch_position(.failure.index()))]
pub struct DataValidationError {
    context: String,
    model: String,
    summary: String,
    role: Option<ValidationRole>,
    #[source]
    failure: ValidationFailure,
}

impl DataValidationError {
    /// Wrap `failure` as a role-less data validation error.
    pub fn new(model: impl Into<String>, failure: ValidationFailure) -> Self {
        Self::with_context("Data validation error in model", model, failure)
    }

    /// Wrap `failure` with a custom leading context line.
    pub fn with_context(
        context: impl Into<String>,
        model: impl Into<String>,
        failure: ValidationFailure,
    ) -> Self {
        let summary = summarize(&failure, MAX_REPORTED_VIOLATIONS);
        Self {
            context: context.into(),
            model: model.into(),
            summary,
            role: None,
            failure,
        }
    }

    fn for_role(role: ValidationRole, model: impl Into<String>, failure: ValidationFailure) -> Self {
        let mut err = Self::with_context(role.context(), model, failure);
        err.role = Some(role);
        err
    }

    /// Identifier of the model (or checker) that raised the error.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The role the failing value played, if raised at the prediction boundary.
    pub fn role(&self) -> Option<ValidationRole> {
        self.role
    }

    /// The bounded violation listing used in the message.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The full, untruncated underlying failure.
    pub fn failure(&self) -> &ValidationFailure {
        &self.failure
    }

    /// Consume the error, returning the underlying failure.
    pub fn into_failure(self) -> ValidationFailure {
        self.failure
    }
}

fn batch_position(index: Option<usize>) -> String {
    index.map(|i| format!(" (batch item {i})")).unwrap_or_default()
}

macro_rules! role_error {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Error, Debug, Clone)]
        #[error(transparent)]
        pub struct $name(DataValidationError);

        impl $name {
            /// Wrap `failure` raised while validating `model`'s values.
            pub fn new(model: impl Into<String>, failure: ValidationFailure) -> Self {
                Self(DataValidationError::for_role($role, model, failure))
            }
        }

        impl Deref for $name {
            type Target = DataValidationError;

            fn deref(&self) -> &DataValidationError {
                &self.0
            }
        }

        impl From<$name> for DataValidationError {
            fn from(err: $name) -> Self {
                err.0
            }
        }
    };
}

role_error!(
    /// An input item failed validation against the item type.
    ItemValidationError,
    ValidationRole::Item
);

role_error!(
    /// A prediction result failed validation against the return type.
    ReturnValueValidationError,
    ValidationRole::ReturnValue
);

/// A validation error raised at the prediction boundary, tagged by role.
#[derive(Error, Debug, Clone)]
pub enum BoundaryValidationError {
    /// Input side.
    #[error(transparent)]
    Item(#[from] ItemValidationError),
    /// Output side.
    #[error(transparent)]
    ReturnValue(#[from] ReturnValueValidationError),
}

impl BoundaryValidationError {
    /// Map `failure` into the error kind for `role`.
    pub fn wrap(model: impl Into<String>, failure: ValidationFailure, role: ValidationRole) -> Self {
        match role {
            ValidationRole::Item => Self::Item(ItemValidationError::new(model, failure)),
            ValidationRole::ReturnValue => {
                Self::ReturnValue(ReturnValueValidationError::new(model, failure))
            }
        }
    }

    /// The role-independent view of the error.
    pub fn as_data(&self) -> &DataValidationError {
        match self {
            Self::Item(e) => &**e,
            Self::ReturnValue(e) => &**e,
        }
    }
}

impl From<BoundaryValidationError> for DataValidationError {
    fn from(err: BoundaryValidationError) -> Self {
        match err {
            BoundaryValidationError::Item(e) => e.into(),
            BoundaryValidationError::ReturnValue(e) => e.into(),
        }
    }
}
