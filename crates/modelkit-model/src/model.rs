//! # Synchronous Models
//!
//! A [`Model`] supplies the prediction function and declares its item and
//! return types. A [`ModelHandle`] wraps it and runs every call through
//! validate-input, predict, validate-output on the caller's thread.
//!
//! ## Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use modelkit_core::LibrarySettings;
//! use modelkit_model::{Data, Model, ModelHandle};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct Input {
//!     x: i64,
//! }
//!
//! struct Doubler;
//!
//! impl Model for Doubler {
//!     type Item = Input;
//!     type Return = i64;
//!     type Error = Infallible;
//!
//!     fn predict(&self, item: Data<Input>) -> Result<Data<i64>, Infallible> {
//!         Ok(item.map(|i| i.x * 2))
//!     }
//! }
//!
//! let handle = ModelHandle::new(Doubler, &LibrarySettings::new()).unwrap();
//! let out = handle.call(Data::raw(json!({"x": 21}))).unwrap();
//! assert_eq!(out.into_typed(), Some(42));
//! assert!(handle.call(Data::raw(json!({"x": "bad"}))).unwrap_err().is_item_validation());
//! ```

use modelkit_core::LibrarySettings;
use modelkit_schema::{Schema, SchemaError};
use serde_json::Value;

use crate::boundary::Boundary;
use crate::data::Data;
use crate::error::ModelError;
use crate::spec::{Declaration, TypeSpec};

/// A synchronous prediction function with declared item and return types.
pub trait Model: Send + Sync {
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
    fn predict(&self, item: Data<Self::Item>) -> Result<Data<Self::Return>, Self::Error>;

    /// Predict a batch. The default calls [`Model::predict`] once per item.
    fn predict_batch(
        &self,
        items: Vec<Data<Self::Item>>,
    ) -> Result<Vec<Data<Self::Return>>, Self::Error> {
        items.into_iter().map(|item| self.predict(item)).collect()
    }
}

type CallResult<M, T> = Result<T, ModelError<<M as Model>::Error>>;

/// A model with its type specs resolved, ready to be called.
pub struct ModelHandle<M: Model> {
    model: M,
    boundary: Boundary<M::Item, M::Return>,
}

impl<M: Model> ModelHandle<M> {
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

    /// Validate `item`, predict, and validate the result.
    pub fn call(&self, item: Data<M::Item>) -> CallResult<M, Data<M::Return>> {
        let item = self.boundary.validate_item(item)?;
        let result = self.model.predict(item).map_err(ModelError::Predict)?;
        Ok(self.boundary.validate_return(result)?)
    }

    /// Validate every item, predict the batch, and validate every result.
    ///
    /// Fails on the first invalid item before the model runs.
    pub fn predict_batch(&self, items: Vec<Data<M::Item>>) -> CallResult<M, Vec<Data<M::Return>>> {
        self.predict_chunk(items, 0)
    }

    /// Like [`predict_batch`](Self::predict_batch), but hands the model at
    /// most `batch_size` items at a time.
    pub fn predict_batch_sized(
        &self,
        items: Vec<Data<M::Item>>,
        batch_size: usize,
    ) -> CallResult<M, Vec<Data<M::Return>>> {
        self.predict_gen(items, batch_size).collect()
    }

    /// Predict a batch given as one untyped value.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ItemValidation` if `items` is not a sequence.
    pub fn predict_batch_value(&self, items: Value) -> CallResult<M, Vec<Data<M::Return>>> {
        let items = self.boundary.split_batch(items)?;
        self.predict_batch(items)
    }

    /// Lazily predict `items`, pulling `batch_size` of them at a time.
    ///
    /// The iterator yields one result per item and ends after the first
    /// error.
    pub fn predict_gen<I>(&self, items: I, batch_size: usize) -> PredictGen<'_, M, I::IntoIter>
    where
        I: IntoIterator<Item = Data<M::Item>>,
    {
        PredictGen {
            handle: self,
            items: items.into_iter(),
            batch_size: batch_size.max(1),
            offset: 0,
            buffer: Vec::new().into_iter(),
            done: false,
        }
    }

    fn predict_chunk(
        &self,
        items: Vec<Data<M::Item>>,
        offset: usize,
    ) -> CallResult<M, Vec<Data<M::Return>>> {
        let expected = items.len();
        let items = self.boundary.validate_items(items, offset)?;
        let results = self.model.predict_batch(items).map_err(ModelError::Predict)?;
        Ok(self.boundary.validate_returns(expected, results, offset)?)
    }
}

/// Iterator returned by [`ModelHandle::predict_gen`].
pub struct PredictGen<'a, M: Model, It> {
    handle: &'a ModelHandle<M>,
    items: It,
    batch_size: usize,
    offset: usize,
    buffer: std::vec::IntoIter<Data<M::Return>>,
    done: bool,
}

impl<M, It> Iterator for PredictGen<'_, M, It>
where
    M: Model,
    It: Iterator<Item = Data<M::Item>>,
{
    type Item = CallResult<M, Data<M::Return>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.buffer.next() {
                return Some(Ok(result));
            }
            if self.done {
                return None;
            }
            let chunk: Vec<_> = self.items.by_ref().take(self.batch_size).collect();
            if chunk.is_empty() {
                self.done = true;
                return None;
            }
            let len = chunk.len();
            match self.handle.predict_chunk(chunk, self.offset) {
                Ok(results) => {
                    self.offset += len;
                    self.buffer = results.into_iter();
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
