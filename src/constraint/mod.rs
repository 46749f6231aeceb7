//! # Constraint Module
//!
//! Constraint-validated collections with structured violation reporting.
//!
//! ## Overview
//!
//! Interface models attach structural constraints to list members: a length
//! bound, uniqueness, or both. This module checks a deserialized sequence
//! against those constraints and either hands the sequence back or reports
//! every violation in a form a server can turn straight into a
//! `400 Bad Request` body:
//!
//! - [`validate`] - check a `Vec<T>` against a [`CollectionConstraints`] set
//! - [`ConstraintViolation`] - one failed constraint with its diagnostic payload
//! - [`ValidationExceptionField`] / [`ValidationException`] - the user-facing shape
//! - [`ConstrainedCollection`] - newtype collections with per-type constraints
//!
//! ## Flow
//!
//! ```text
//! raw body -> deserializer -> Vec<T> -> validate() -> Ok(Vec<T>) -> domain value
//!                                                 \-> Err(violations)
//!                                                       -> as_validation_exception_field(path)
//!                                                       -> ValidationException (JSON)
//! ```
//!
//! ## Uniqueness
//!
//! Duplicate detection runs in O(n) expected time and keeps one entry per
//! distinct value. See [`duplicate_indices`] for the index-selection rules.
//! Only the partition of repeated values is a stable contract; which
//! occurrence is reported first among equal values is not.
//!
//! ## Thread Safety
//!
//! Everything here is a pure function of its arguments; call it from any
//! number of threads without synchronization.

mod collection;
mod validator;
mod violation;


pub use collection::ConstrainedCollection;
pub use validator::{
    duplicate_indices, validate, CollectionConstraints, Constraint, LengthBound,
};
pub use violation::{ConstraintViolation, ValidationException, ValidationExceptionField};
