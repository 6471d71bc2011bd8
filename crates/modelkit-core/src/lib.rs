//! # modelkit-core — Foundational Types
//!
//! Leaf crate of the modelkit workspace. Defines what a validation failure
//! looks like, how it is reported to callers, and the settings that switch
//! validation off.
//!
//! ## Key Design Principles
//!
//! 1. **Full diagnostics, bounded messages.** A [`ValidationFailure`] keeps
//!    every [`Violation`]. The domain errors built from it render at most
//!    [`MAX_REPORTED_VIOLATIONS`] of them and keep the rest as their source.
//!
//! 2. **Role-specialized errors.** [`ItemValidationError`] and
//!    [`ReturnValueValidationError`] separate "bad request" from "model
//!    produced malformed output". Both convert into the base
//!    [`DataValidationError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `modelkit-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod settings;
pub mod violation;

pub use error::{
    summarize, BoundaryValidationError, DataValidationError, ItemValidationError,
    ReturnValueValidationError, ValidationRole, MAX_REPORTED_VIOLATIONS,
};
pub use settings::{LibrarySettings, SettingsError, DISABLE_VALIDATION_ENV};
pub use violation::{
    ValidationFailure, ValidationViolations, Violation, MAX_RENDERED_VIOLATION_CHARS,
};
