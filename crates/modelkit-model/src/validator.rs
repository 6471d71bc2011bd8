//! # Item and Batch Validation
//!
//! Every value crossing the boundary goes through one [`Decision`]:
//!
//! - **Identity**: validation is disabled, the role is unchecked, or the
//!   value is already `Typed`. The value is returned as it came in.
//! - **Construct**: a `Raw` value satisfied the schema and was built into
//!   the declared type, with defaults applied.
//! - **Reject**: a `Raw` value did not satisfy the schema.
//!
//! Rejections are mapped to [`ItemValidationError`] or
//! [`ReturnValueValidationError`] according to the validator's role.
//!
//! [`ItemValidationError`]: modelkit_core::ItemValidationError
//! [`ReturnValueValidationError`]: modelkit_core::ReturnValueValidationError

use modelkit_core::{BoundaryValidationError, ValidationFailure, ValidationRole};
use serde::de::DeserializeOwned;

use crate::data::Data;
use crate::spec::TypeSpec;

/// Outcome of validating one value.
#[derive(Debug)]
pub enum Decision<T> {
    /// Pass the value through untouched.
    Identity(Data<T>),
    /// A new instance built from a raw value.
    Construct(T),
    /// The raw value does not satisfy the declared type.
    Reject(ValidationFailure),
}

impl<T: DeserializeOwned> Decision<T> {
    /// Decide what happens to `data` under `spec`.
    pub fn decide(data: Data<T>, spec: &TypeSpec<T>, disabled: bool) -> Self {
        if disabled {
            return Self::Identity(data);
        }
        match (spec, data) {
            (TypeSpec::Unchecked, data) => Self::Identity(data),
            (TypeSpec::Checked(_), data @ Data::Typed(_)) => Self::Identity(data),
            (TypeSpec::Checked(schema), Data::Raw(value)) => match schema.construct(value) {
                Ok(typed) => Self::Construct(typed),
                Err(failure) => Self::Reject(failure),
            },
        }
    }
}

/// Validates single values for one role of one model.
#[derive(Debug)]
pub struct ItemValidator<'a, T> {
    spec: &'a TypeSpec<T>,
    role: ValidationRole,
    disabled: bool,
    model: &'a str,
}

// Manual impls: the validator only holds references, so `T` needs no bounds.
impl<T> Clone for ItemValidator<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ItemValidator<'_, T> {}

impl<'a, T: DeserializeOwned> ItemValidator<'a, T> {
    /// A validator for `role` values of `model`.
    pub fn new(spec: &'a TypeSpec<T>, role: ValidationRole, disabled: bool, model: &'a str) -> Self {
        Self {
            spec,
            role,
            disabled,
            model,
        }
    }

    /// True if this validator returns every value unchanged.
    pub fn is_passthrough(&self) -> bool {
        self.disabled || !self.spec.is_checked()
    }

    /// Validate one value.
    ///
    /// # Errors
    ///
    /// Returns the role's validation error if `data` is raw and does not
    /// satisfy the declared type.
    pub fn validate(&self, data: Data<T>) -> Result<Data<T>, BoundaryValidationError> {
        self.validate_at(data, None)
    }

    fn validate_at(
        &self,
        data: Data<T>,
        index: Option<usize>,
    ) -> Result<Data<T>, BoundaryValidationError> {
        match Decision::decide(data, self.spec, self.disabled) {
            Decision::Identity(data) => {
                tracing::trace!(model = %self.model, role = %self.role, "value passed through unchanged");
                Ok(data)
            }
            Decision::Construct(typed) => {
                tracing::trace!(model = %self.model, role = %self.role, "constructed value from raw input");
                Ok(Data::Typed(typed))
            }
            Decision::Reject(failure) => {
                let failure = match index {
                    Some(i) => failure.at_index(i),
                    None => failure,
                };
                tracing::debug!(
                    model = %self.model,
                    role = %self.role,
                    violations = failure.violations().len(),
                    index = ?failure.index(),
                    "validation failed"
                );
                Err(BoundaryValidationError::wrap(self.model, failure, self.role))
            }
        }
    }
}

/// Validates ordered sequences, element by element, failing fast.
#[derive(Debug)]
pub struct BatchValidator<'a, T> {
    item: ItemValidator<'a, T>,
}

impl<'a, T: DeserializeOwned> BatchValidator<'a, T> {
    /// A batch validator applying `item` to every element.
    pub fn new(item: ItemValidator<'a, T>) -> Self {
        Self { item }
    }

    /// Validate a whole batch. `result[i]` corresponds to `items[i]`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first invalid element; later elements are
    /// not inspected.
    pub fn validate(&self, items: Vec<Data<T>>) -> Result<Vec<Data<T>>, BoundaryValidationError> {
        self.validate_from(items, 0)
    }

    /// Validate a slice of a larger batch that starts at position `offset`,
    /// so errors name the element's position in the whole batch.
    pub fn validate_from(
        &self,
        items: Vec<Data<T>>,
        offset: usize,
    ) -> Result<Vec<Data<T>>, BoundaryValidationError> {
        if self.item.is_passthrough() {
            return Ok(items);
        }
        items
            .into_iter()
            .enumerate()
            .map(|(i, data)| self.item.validate_at(data, Some(offset + i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_schema::SchemaType;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, PartialEq, Deserialize, JsonSchema)]
    struct ItemModel {
        x: i64,
    }

    fn checked() -> TypeSpec<ItemModel> {
        TypeSpec::Checked(SchemaType::derive().unwrap())
    }

    #[test]
    fn decide_identity_for_typed() {
        let decision = Decision::decide(Data::Typed(ItemModel { x: 1 }), &checked(), false);
        assert!(matches!(decision, Decision::Identity(Data::Typed(ItemModel { x: 1 }))));
    }

    #[test]
    fn decide_construct_for_valid_raw() {
        let decision = Decision::decide(Data::raw(json!({"x": 1})), &checked(), false);
        assert!(matches!(decision, Decision::Construct(ItemModel { x: 1 })));
    }

    #[test]
    fn decide_reject_for_invalid_raw() {
        let decision = Decision::decide(Data::raw(json!({"x": "bad"})), &checked(), false);
        assert!(matches!(decision, Decision::Reject(_)));
    }

    #[test]
    fn decide_identity_when_disabled_or_unchecked() {
        let decision = Decision::decide(Data::<ItemModel>::raw(json!(1)), &checked(), true);
        assert!(matches!(decision, Decision::Identity(Data::Raw(_))));
        let decision = Decision::decide(Data::<ItemModel>::raw(json!(1)), &TypeSpec::Unchecked, false);
        assert!(matches!(decision, Decision::Identity(Data::Raw(_))));
    }

    #[test]
    fn item_role_maps_to_item_error() {
        let spec = checked();
        let validator = ItemValidator::new(&spec, ValidationRole::Item, false, "m");
        let err = validator.validate(Data::raw(json!({"ok": 1}))).unwrap_err();
        assert!(matches!(err, BoundaryValidationError::Item(_)));
    }

    #[test]
    fn return_role_maps_to_return_error() {
        let spec = checked();
        let validator = ItemValidator::new(&spec, ValidationRole::ReturnValue, false, "m");
        let err = validator.validate(Data::raw(json!({"x": "bad"}))).unwrap_err();
        assert!(matches!(err, BoundaryValidationError::ReturnValue(_)));
    }

    #[test]
    fn batch_fails_on_first_offender() {
        let spec = checked();
        let batch = BatchValidator::new(ItemValidator::new(&spec, ValidationRole::Item, false, "m"));
        let items = vec![
            Data::raw(json!({"x": 1})),
            Data::raw(json!({"x": 2})),
            Data::raw(json!({"x": "third"})),
            Data::raw(json!({"x": "fourth"})),
        ];
        let err = batch.validate(items).unwrap_err();
        let failure = err.as_data().failure();
        assert_eq!(failure.index(), Some(2));
        assert_eq!(failure.violations().len(), 1);
        assert_eq!(failure.violations().violations()[0].offered, json!("third"));
    }

    #[test]
    fn batch_offset_shifts_reported_index() {
        let spec = checked();
        let batch = BatchValidator::new(ItemValidator::new(&spec, ValidationRole::Item, false, "m"));
        let err = batch.validate_from(vec![Data::raw(json!({}))], 40).unwrap_err();
        assert_eq!(err.as_data().failure().index(), Some(40));
    }

    #[test]
    fn batch_preserves_order() {
        let spec = checked();
        let batch = BatchValidator::new(ItemValidator::new(&spec, ValidationRole::Item, false, "m"));
        let items = (0..5)
            .map(|x| if x % 2 == 0 { Data::raw(json!({ "x": x })) } else { Data::Typed(ItemModel { x }) })
            .collect();
        let out: Vec<i64> = batch
            .validate(items)
            .unwrap()
            .into_iter()
            .map(|d| d.into_typed().unwrap().x)
            .collect();
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn passthrough_batch_returns_input() {
        let spec = TypeSpec::<Value>::Unchecked;
        let batch = BatchValidator::new(ItemValidator::new(&spec, ValidationRole::Item, false, "m"));
        let items = vec![Data::raw(json!(1)), Data::raw(json!("two"))];
        assert_eq!(batch.validate(items.clone()).unwrap(), items);
    }
}
