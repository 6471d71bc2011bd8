//! # Validation Boundary
//!
//! The state a model handle resolves once at construction: its identifier,
//! its item and return specs, and the disable switch. Sync and async
//! handles drive the same boundary, so both call shapes validate exactly
//! alike.

use modelkit_core::{
    BoundaryValidationError, LibrarySettings, ValidationFailure, ValidationRole, Violation,
};
use modelkit_schema::{Schema, SchemaError};
use serde_json::Value;

use crate::data::Data;
use crate::spec::{Declaration, TypeSpec};
use crate::validator::{BatchValidator, ItemValidator};

#[derive(Debug)]
pub(crate) struct Boundary<I, R> {
    identifier: String,
    item_spec: TypeSpec<I>,
    return_spec: TypeSpec<R>,
    disabled: bool,
}

impl<I: Schema, R: Schema> Boundary<I, R> {
    pub(crate) fn resolve(
        identifier: String,
        item: Declaration,
        ret: Declaration,
        settings: &LibrarySettings,
    ) -> Result<Self, SchemaError> {
        let (item_spec, return_spec) = crate::spec::resolve(item, ret)?;
        if settings.disable_validation {
            tracing::warn!(model = %identifier, "validation disabled; values pass through unchecked");
        }
        tracing::debug!(
            model = %identifier,
            item = ?item_spec,
            return_value = ?return_spec,
            "resolved type specs"
        );
        Ok(Self {
            identifier,
            item_spec,
            return_spec,
            disabled: settings.disable_validation,
        })
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn item_spec(&self) -> &TypeSpec<I> {
        &self.item_spec
    }

    pub(crate) fn return_spec(&self) -> &TypeSpec<R> {
        &self.return_spec
    }

    pub(crate) fn disabled(&self) -> bool {
        self.disabled
    }

    fn items(&self) -> ItemValidator<'_, I> {
        ItemValidator::new(&self.item_spec, ValidationRole::Item, self.disabled, &self.identifier)
    }

    fn returns(&self) -> ItemValidator<'_, R> {
        ItemValidator::new(
            &self.return_spec,
            ValidationRole::ReturnValue,
            self.disabled,
            &self.identifier,
        )
    }

    pub(crate) fn validate_item(&self, item: Data<I>) -> Result<Data<I>, BoundaryValidationError> {
        self.items().validate(item)
    }

    pub(crate) fn validate_return(&self, result: Data<R>) -> Result<Data<R>, BoundaryValidationError> {
        self.returns().validate(result)
    }

    pub(crate) fn validate_items(
        &self,
        items: Vec<Data<I>>,
        offset: usize,
    ) -> Result<Vec<Data<I>>, BoundaryValidationError> {
        BatchValidator::new(self.items()).validate_from(items, offset)
    }

    /// Validate the results of a batch of `expected` items.
    ///
    /// The result count is only checked when return values are validated;
    /// a passthrough role hands back whatever the model produced.
    pub(crate) fn validate_returns(
        &self,
        expected: usize,
        results: Vec<Data<R>>,
        offset: usize,
    ) -> Result<Vec<Data<R>>, BoundaryValidationError> {
        let returns = self.returns();
        if returns.is_passthrough() {
            return Ok(results);
        }
        if results.len() != expected {
            let failure = ValidationFailure::new(
                R::schema_name(),
                vec![Violation::at_root(
                    format!(
                        "batch prediction returned {} result(s) for {expected} item(s)",
                        results.len()
                    ),
                    Value::from(results.len()),
                )],
            );
            return Err(BoundaryValidationError::wrap(
                &self.identifier,
                failure,
                ValidationRole::ReturnValue,
            ));
        }
        BatchValidator::new(returns).validate_from(results, offset)
    }

    /// Split an untyped batch into items, rejecting anything that is not a
    /// sequence.
    pub(crate) fn split_batch(&self, value: Value) -> Result<Vec<Data<I>>, BoundaryValidationError> {
        match value {
            Value::Array(values) => Ok(values.into_iter().map(Data::Raw).collect()),
            other => {
                let failure = ValidationFailure::new(
                    I::schema_name(),
                    vec![Violation::at_root(
                        format!("expected a sequence of items, got {}", kind_of(&other)),
                        other,
                    )],
                );
                Err(BoundaryValidationError::wrap(
                    &self.identifier,
                    failure,
                    ValidationRole::Item,
                ))
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize, JsonSchema)]
    struct ItemModel {
        x: i64,
    }

    fn boundary(settings: &LibrarySettings) -> Boundary<ItemModel, ItemModel> {
        Boundary::resolve("m".into(), Declaration::Checked, Declaration::Checked, settings).unwrap()
    }

    #[test]
    fn resolves_once_with_settings() {
        let b = boundary(&LibrarySettings::new());
        assert_eq!(b.identifier(), "m");
        assert!(b.item_spec().is_checked());
        assert!(b.return_spec().is_checked());
        assert!(!b.disabled());
        assert!(boundary(&LibrarySettings::new().with_disable_validation(true)).disabled());
    }

    #[test]
    fn result_count_mismatch_is_a_return_error() {
        let b = boundary(&LibrarySettings::new());
        let err = b
            .validate_returns(3, vec![Data::Typed(ItemModel { x: 1 })], 0)
            .unwrap_err();
        assert!(matches!(err, BoundaryValidationError::ReturnValue(_)));
        assert!(err.to_string().contains("returned 1 result(s) for 3 item(s)"));
    }

    #[test]
    fn result_count_is_not_checked_when_returns_pass_through() {
        let b = boundary(&LibrarySettings::new().with_disable_validation(true));
        let out = b.validate_returns(3, vec![Data::raw(json!(1))], 0).unwrap();
        assert_eq!(out, vec![Data::raw(json!(1))]);

        let skipped: Boundary<ItemModel, ItemModel> = Boundary::resolve(
            "m".into(),
            Declaration::Checked,
            Declaration::SkipValidation,
            &LibrarySettings::new(),
        )
        .unwrap();
        assert!(skipped.validate_returns(2, Vec::new(), 0).unwrap().is_empty());
    }

    #[test]
    fn non_sequence_batch_is_an_item_error() {
        let b = boundary(&LibrarySettings::new());
        let err = b.split_batch(json!("x")).unwrap_err();
        assert!(matches!(err, BoundaryValidationError::Item(_)));
        assert!(err.to_string().contains("got a string"));
        assert_eq!(b.split_batch(json!([1, 2])).unwrap().len(), 2);
    }
}
