//! # Asynchronous Models
//!
//! The async counterpart of [`crate::model`]. Validation is identical and
//! never suspends; the only await point is the model's own prediction.
//! Dropping a call future while the prediction is pending skips output
//! validation entirely.

use async_trait::async_trait;
use modelkit_core::LibrarySettings;
use modelkit_schema::{Schema, SchemaError};
use serde_json::Value;

use crate::boundary::Boundary;
use crate::data::Data;
use crate::error::ModelError;
use crate::spec::{Declaration, TypeSpec};

/// An asynchronous prediction function with declared item and return types.
#[async_trait]
pub trait AsyncModel: Send + Sync {
    /// Type of a single input. `serde_json::Value` accepts anything.
    type Item: Schema;
    /// Type of a single output. `serde_json::Value` accepts anything.
    type Return: Schema;
    /// Error the prediction function may fail with.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether items are validated.
    const ITEM: Declaration = Declaration::Checked;
    /// Whether return values are validated.
    const RETURN: Declaration = Declaration::Checked;

    /// Name used in diagnostics.
    fn identifier(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Predict one item.
    async fn predict(&self, item: Data<Self::Item>) -> Result<Data<Self::Return>, Self::Error>;

    /// Predict a batch. The default awaits [`AsyncModel::predict`] once per
    /// item, in order.
    async fn predict_batch(
        &self,
        items: Vec<Data<Self::Item>>,
    ) -> Result<Vec<Data<Self::Return>>, Self::Error> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.predict(item).await?);
        }
        Ok(results)
    }
}

type CallResult<M, T> = Result<T, ModelError<<M as AsyncModel>::Error>>;

/// An async model with its type specs resolved, ready to be called.
pub struct AsyncModelHandle<M: AsyncModel> {
    model: M,
    boundary: Boundary<M::Item, M::Return>,
}

impl<M: AsyncModel> AsyncModelHandle<M> {
    /// Resolve `model`'s type specs and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a declared type's schema does not compile.
    pub fn new(model: M, settings: &LibrarySettings) -> Result<Self, SchemaError> {
        let boundary = Boundary::resolve(model.identifier(), M::ITEM, M::RETURN, settings)?;
        Ok(Self { model, boundary })
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Name used in diagnostics.
    pub fn identifier(&self) -> &str {
        self.boundary.identifier()
    }

    /// Resolved item spec.
    pub fn item_spec(&self) -> &TypeSpec<M::Item> {
        self.boundary.item_spec()
    }

    /// Resolved return spec.
    pub fn return_spec(&self) -> &TypeSpec<M::Return> {
        self.boundary.return_spec()
    }

    /// True if the handle was built with validation disabled.
    pub fn validation_disabled(&self) -> bool {
        self.boundary.disabled()
    }

    /// Validate `item`, await the prediction, and validate the result.
    pub async fn call(&self, item: Data<M::Item>) -> CallResult<M, Data<M::Return>> {
        let item = self.boundary.validate_item(item)?;
        let result = self.model.predict(item).await.map_err(ModelError::Predict)?;
        Ok(self.boundary.validate_return(result)?)
    }

    /// Validate every item, await the batch prediction, and validate every
    /// result.
    pub async fn predict_batch(
        &self,
        items: Vec<Data<M::Item>>,
    ) -> CallResult<M, Vec<Data<M::Return>>> {
        self.predict_chunk(items, 0).await
    }

    /// Like [`predict_batch`](Self::predict_batch), but hands the model at
    /// most `batch_size` items at a time, one chunk after the other.
    pub async fn predict_batch_sized(
        &self,
        items: Vec<Data<M::Item>>,
        batch_size: usize,
    ) -> CallResult<M, Vec<Data<M::Return>>> {
        let batch_size = batch_size.max(1);
        let mut results = Vec::with_capacity(items.len());
        let mut items = items.into_iter();
        loop {
            let chunk: Vec<_> = items.by_ref().take(batch_size).collect();
            if chunk.is_empty() {
                return Ok(results);
            }
            let offset = results.len();
            results.extend(self.predict_chunk(chunk, offset).await?);
        }
    }

    /// Predict a batch given as one untyped value.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ItemValidation` if `items` is not a sequence.
    pub async fn predict_batch_value(&self, items: Value) -> CallResult<M, Vec<Data<M::Return>>> {
        let items = self.boundary.split_batch(items)?;
        self.predict_batch(items).await
    }

    async fn predict_chunk(
        &self,
        items: Vec<Data<M::Item>>,
        offset: usize,
    ) -> CallResult<M, Vec<Data<M::Return>>> {
        let expected = items.len();
        let items = self.boundary.validate_items(items, offset)?;
        let results = self.model.predict_batch(items).await.map_err(ModelError::Predict)?;
        Ok(self.boundary.validate_returns(expected, results, offset)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Deserialize, JsonSchema)]
    struct ItemModel {
        x: i64,
    }

    #[derive(Default)]
    struct Recorder {
        batches: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl AsyncModel for Recorder {
        type Item = ItemModel;
        type Return = ItemModel;
        type Error = Infallible;

        async fn predict(&self, item: Data<ItemModel>) -> Result<Data<ItemModel>, Infallible> {
            Ok(item)
        }

        async fn predict_batch(
            &self,
            items: Vec<Data<ItemModel>>,
        ) -> Result<Vec<Data<ItemModel>>, Infallible> {
            self.batches.lock().unwrap().push(items.len());
            tokio::task::yield_now().await;
            Ok(items)
        }
    }

    fn raw_items(n: i64) -> Vec<Data<ItemModel>> {
        (0..n).map(|x| Data::raw(json!({ "x": x }))).collect()
    }

    #[tokio::test]
    async fn sized_batches_are_chunked_in_order() {
        let handle = AsyncModelHandle::new(Recorder::default(), &LibrarySettings::new()).unwrap();
        let out = handle.predict_batch_sized(raw_items(5), 2).await.unwrap();
        let xs: Vec<i64> = out.into_iter().map(|d| d.into_typed().unwrap().x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4]);
        assert_eq!(*handle.model().batches.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn sized_batch_error_names_global_index() {
        let handle = AsyncModelHandle::new(Recorder::default(), &LibrarySettings::new()).unwrap();
        let mut items = raw_items(4);
        items[3] = Data::raw(json!({"x": []}));
        let err = handle.predict_batch_sized(items, 2).await.unwrap_err();
        assert_eq!(err.validation().unwrap().failure().index(), Some(3));
    }

    #[tokio::test]
    async fn batch_value_must_be_a_sequence() {
        let handle = AsyncModelHandle::new(Recorder::default(), &LibrarySettings::new()).unwrap();
        let err = handle.predict_batch_value(json!(1)).await.unwrap_err();
        assert!(err.is_item_validation());
        assert!(handle.identifier().ends_with("Recorder"));
    }
}
