//! Collection validator - the hot path for constrained request members.
//!
//! Every constrained list in a deserialized request goes through [`validate`]
//! exactly once, after parsing and before the domain value is built.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

use super::ConstraintViolation;

/// Inclusive bounds on a collection length.
///
/// At least one side is always present: the only way to build a bound is
/// through [`between`](Self::between), [`at_least`](Self::at_least) or
/// [`at_most`](Self::at_most).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LengthBound {
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthBound {
    /// `min..=max`. Used in `const` items, where an inverted range fails the build.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`. Use [`try_between`](Self::try_between) for bounds
    /// that come from runtime input.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn between(min: usize, max: usize) -> Self {
        if min > max {
            panic!("LengthBound::between requires min <= max");
        }
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// `min..=max`, or `None` when the range is inverted.
    #[must_use]
    pub const fn try_between(min: usize, max: usize) -> Option<Self> {
        if min > max {
            return None;
        }
        Some(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    #[must_use]
    pub const fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    #[must_use]
    pub const fn at_most(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    #[must_use]
    pub const fn min(&self) -> Option<usize> {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether a collection of `len` items satisfies the bound.
    #[must_use]
    pub const fn contains(&self, len: usize) -> bool {
        if let Some(min) = self.min {
            if len < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for LengthBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "between {min} and {max}, inclusive"),
            (Some(min), None) => write!(f, "greater than or equal to {min}"),
            (None, Some(max)) => write!(f, "less than or equal to {max}"),
            // Not constructible; keep the formatter total anyway.
            (None, None) => f.write_str("of any size"),
        }
    }
}

/// One declarative rule attached to a collection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    Length(LengthBound),
    UniqueItems,
}

/// The full set of constraints active on one collection type.
///
/// Derived once from the interface model; `const`-constructible so generated
/// types can carry it as an associated constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollectionConstraints {
    pub length: Option<LengthBound>,
    pub unique_items: bool,
}

impl CollectionConstraints {
    /// No constraints: every input is valid.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            length: None,
            unique_items: false,
        }
    }

    #[must_use]
    pub const fn with_length(mut self, bound: LengthBound) -> Self {
        self.length = Some(bound);
        self
    }

    #[must_use]
    pub const fn with_unique_items(mut self) -> Self {
        self.unique_items = true;
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length.is_none() && !self.unique_items
    }
}

impl FromIterator<Constraint> for CollectionConstraints {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, constraint| match constraint {
                Constraint::Length(bound) => acc.with_length(bound),
                Constraint::UniqueItems => acc.with_unique_items(),
            })
    }
}

/// Validate `items` against `constraints`.
///
/// Every active constraint is evaluated and every violation is returned, in
/// the order: length, then uniqueness. On success the input is handed back
/// untouched. On a uniqueness failure the input moves into the
/// [`ConstraintViolation::UniqueItems`] payload.
///
/// # Example
///
/// ```
/// use shapegate::constraint::{validate, CollectionConstraints, ConstraintViolation};
///
/// const TAGS: CollectionConstraints = CollectionConstraints::new().with_unique_items();
///
/// let err = validate(vec!["a", "a", "b", "c"], &TAGS).unwrap_err();
/// match &err[0] {
///     ConstraintViolation::UniqueItems { duplicates, original } => {
///         assert_eq!(duplicates, &vec![0, 1]);
///         assert_eq!(original, &vec!["a", "a", "b", "c"]);
///     }
///     other => panic!("unexpected violation: {other}"),
/// }
/// ```
pub fn validate<T: Eq + Hash>(
    items: Vec<T>,
    constraints: &CollectionConstraints,
) -> Result<Vec<T>, Vec<ConstraintViolation<T>>> {
    let mut violations = Vec::new();

    if let Some(bound) = constraints.length {
        let actual = items.len();
        if !bound.contains(actual) {
            violations.push(ConstraintViolation::Length { actual, bound });
        }
    }

    if constraints.unique_items {
        let duplicates = duplicate_indices(&items);
        if !duplicates.is_empty() {
            violations.push(ConstraintViolation::UniqueItems {
                duplicates,
                original: items,
            });
            debug!(
                violation_count = violations.len(),
                "Collection failed validation"
            );
            return Err(violations);
        }
    }

    if violations.is_empty() {
        Ok(items)
    } else {
        debug!(
            violation_count = violations.len(),
            "Collection failed validation"
        );
        Err(violations)
    }
}

/// Indices of repeated values in `items`; empty when all items are distinct.
///
/// Single left-to-right scan keeping only the latest index per distinct value.
/// Each repeat records the index it displaces. The final occurrence of a
/// repeated value is never displaced, so those are flushed after the scan,
/// which guarantees every repeated value contributes at least two indices.
///
/// Output order: displaced indices in scan order, then the flushed final
/// occurrences in ascending order. The order is stable across calls for the
/// same input but is not otherwise part of the contract.
#[must_use]
pub fn duplicate_indices<T: Eq + Hash>(items: &[T]) -> Vec<usize> {
    // value -> (latest index, seen more than once)
    let mut latest: HashMap<&T, (usize, bool)> = HashMap::with_capacity(items.len());
    let mut duplicates = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        match latest.entry(item) {
            Entry::Occupied(mut slot) => {
                let (previous, repeated) = slot.get_mut();
                duplicates.push(*previous);
                *previous = idx;
                *repeated = true;
            }
            Entry::Vacant(slot) => {
                slot.insert((idx, false));
            }
        }
    }

    // Map iteration order is randomized per instance; sort the tail.
    let flushed_from = duplicates.len();
    duplicates.extend(
        latest
            .values()
            .filter(|(_, repeated)| *repeated)
            .map(|(idx, _)| *idx),
    );
    duplicates[flushed_from..].sort_unstable();

    duplicates
}
