use std::hash::Hash;

use super::{validate, CollectionConstraints, ConstraintViolation};

/// A collection newtype whose constraints are fixed by its type.
///
/// Generated SDK code declares one of these per constrained list shape; the
/// deserializer calls [`try_from_items`](Self::try_from_items) once per field
/// and turns any violations into a validation error.
///
/// # Example
///
/// ```
/// use shapegate::constraint::{
///     CollectionConstraints, ConstrainedCollection, LengthBound,
/// };
///
/// #[derive(Debug)]
/// struct TagList(Vec<String>);
///
/// impl ConstrainedCollection for TagList {
///     type Item = String;
///     const CONSTRAINTS: CollectionConstraints = CollectionConstraints::new()
///         .with_length(LengthBound::between(1, 4))
///         .with_unique_items();
///
///     fn from_validated(items: Vec<String>) -> Self {
///         TagList(items)
///     }
///
///     fn as_items(&self) -> &[String] {
///         &self.0
///     }
/// }
///
/// let tags = TagList::try_from_items(vec!["red".into(), "blue".into()]).unwrap();
/// assert_eq!(tags.as_items().len(), 2);
/// assert!(TagList::try_from_items(vec!["red".into(), "red".into()]).is_err());
/// ```
pub trait ConstrainedCollection: Sized {
    type Item: Eq + Hash;

    /// Constraints every instance of this type satisfies.
    const CONSTRAINTS: CollectionConstraints;

    /// Wrap items that have already passed validation.
    fn from_validated(items: Vec<Self::Item>) -> Self;

    fn as_items(&self) -> &[Self::Item];

    /// Validate `items` and wrap them, or return every violation found.
    fn try_from_items(
        items: Vec<Self::Item>,
    ) -> Result<Self, Vec<ConstraintViolation<Self::Item>>> {
        validate(items, &Self::CONSTRAINTS).map(Self::from_validated)
    }
}
