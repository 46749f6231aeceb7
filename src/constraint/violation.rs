use serde::Serialize;
use std::fmt;

use super::LengthBound;

/// A constraint that a collection failed to satisfy.
///
/// Only ever produced by a failed [`validate`](super::validate) call. Each
/// variant carries everything needed to render a message for the caller, so
/// the original input never has to be scanned a second time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation<T> {
    /// The collection length fell outside `bound`.
    Length {
        /// Number of items that were supplied
        actual: usize,
        /// The bound that was violated
        bound: LengthBound,
    },
    /// The collection contained equal items.
    UniqueItems {
        /// Indices of repeated values; every repeated value contributes at
        /// least two indices
        duplicates: Vec<usize>,
        /// The full input, duplicates included
        original: Vec<T>,
    },
}

impl<T> ConstraintViolation<T> {
    /// Short machine-readable name of the violated constraint.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintViolation::Length { .. } => "length",
            ConstraintViolation::UniqueItems { .. } => "uniqueItems",
        }
    }

    /// Render this violation as a field error at `path`.
    ///
    /// `path` is the location of the field inside the containing structure
    /// (e.g. `/items`). It is supplied by the caller; the violation itself
    /// does not know where the collection lived.
    ///
    /// # Example
    ///
    /// ```
    /// use shapegate::constraint::{validate, CollectionConstraints, LengthBound};
    ///
    /// const ITEMS: CollectionConstraints = CollectionConstraints::new()
    ///     .with_length(LengthBound::between(2, 8));
    ///
    /// let violations = validate(vec!["a"], &ITEMS).unwrap_err();
    /// let field = violations[0].as_validation_exception_field("/items");
    /// assert_eq!(
    ///     field.message,
    ///     "Value with length 1 at '/items' failed to satisfy constraint: \
    ///      Member must have length between 2 and 8, inclusive"
    /// );
    /// ```
    #[must_use]
    pub fn as_validation_exception_field(&self, path: impl Into<String>) -> ValidationExceptionField {
        let path = path.into();
        let message = match self {
            ConstraintViolation::Length { actual, bound } => format!(
                "Value with length {actual} at '{path}' failed to satisfy constraint: Member must have length {bound}"
            ),
            ConstraintViolation::UniqueItems { duplicates, .. } => format!(
                "Value with repeated values at indices {duplicates:?} at '{path}' failed to satisfy constraint: Member must have unique values"
            ),
        };
        ValidationExceptionField { message, path }
    }
}

impl<T> fmt::Display for ConstraintViolation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::Length { actual, bound } => {
                write!(f, "length {actual} violates: must have length {bound}")
            }
            ConstraintViolation::UniqueItems { duplicates, .. } => {
                write!(f, "repeated values at indices {duplicates:?}")
            }
        }
    }
}

impl<T: fmt::Debug> std::error::Error for ConstraintViolation<T> {}

/// A single field error, ready for an error-response serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationExceptionField {
    /// Human-readable description of the failure
    pub message: String,
    /// Location of the offending field (caller supplied)
    pub path: String,
}

/// Aggregate of every field error found while validating one input.
///
/// Serializes as `{"message": "...", "fieldList": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationException {
    pub message: String,
    pub field_list: Vec<ValidationExceptionField>,
}

impl ValidationException {
    /// Build the aggregate error. The headline message counts the fields and
    /// repeats the first field's message.
    ///
    /// Returns `None` when `fields` is empty; there is nothing to report.
    #[must_use]
    pub fn from_fields(fields: Vec<ValidationExceptionField>) -> Option<Self> {
        let first = fields.first()?;
        let message = match fields.len() {
            1 => format!("1 validation error detected. {}", first.message),
            n => format!("{n} validation errors detected. {}", first.message),
        };
        Some(Self {
            message,
            field_list: fields,
        })
    }

    /// Convenience for the common case of one collection field.
    #[must_use]
    pub fn from_violations<T>(
        violations: &[ConstraintViolation<T>],
        path: &str,
    ) -> Option<Self> {
        Self::from_fields(
            violations
                .iter()
                .map(|v| v.as_validation_exception_field(path))
                .collect(),
        )
    }
}

impl fmt::Display for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationException {}
