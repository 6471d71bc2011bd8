//! # modelkit-model — Validated Prediction Boundary
//!
//! Wraps a user prediction function so that every input is validated
//! against the declared item type before the function runs, and every
//! output is validated against the declared return type after it returns.
//!
//! ## Flow
//!
//! 1. [`ModelHandle::new`] / [`AsyncModelHandle::new`] resolve the model's
//!    [`Declaration`]s into [`TypeSpec`]s, once.
//! 2. Each call runs validate-input, predict, validate-output.
//! 3. Batches are validated element by element and fail on the first
//!    offender, naming its position.
//!
//! ## Identity
//!
//! [`Data::Typed`] values and values of unchecked roles come back as the
//! same object. Only [`Data::Raw`] values are ever rebuilt.
//!
//! ## Crate Policy
//!
//! - Validation never suspends; async handles await only the model.
//! - Prediction errors are returned unmodified as [`ModelError::Predict`].

mod boundary;

pub mod asynchronous;
pub mod data;
pub mod error;
pub mod model;
pub mod spec;
pub mod validator;

pub use asynchronous::{AsyncModel, AsyncModelHandle};
pub use data::Data;
pub use error::ModelError;
pub use model::{Model, ModelHandle, PredictGen};
pub use spec::{Declaration, TypeSpec};
pub use validator::{BatchValidator, Decision, ItemValidator};
