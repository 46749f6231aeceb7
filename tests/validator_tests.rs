use proptest::prelude::*;
use shapegate::constraint::{
    duplicate_indices, validate, CollectionConstraints, ConstrainedCollection,
    ConstraintViolation, LengthBound, ValidationException,
};
use std::collections::{HashMap, HashSet};

const LENGTH_2_8: CollectionConstraints =
    CollectionConstraints::new().with_length(LengthBound::between(2, 8));

const UNIQUE: CollectionConstraints = CollectionConstraints::new().with_unique_items();

#[derive(Debug)]
struct ShapeList(Vec<String>);

impl ConstrainedCollection for ShapeList {
    type Item = String;
    const CONSTRAINTS: CollectionConstraints = CollectionConstraints::new()
        .with_length(LengthBound::between(2, 8))
        .with_unique_items();

    fn from_validated(items: Vec<String>) -> Self {
        ShapeList(items)
    }

    fn as_items(&self) -> &[String] {
        &self.0
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_length_2_8_boundaries() {
    for (len, ok) in [(0, false), (1, false), (2, true), (5, true), (8, true), (9, false)] {
        let items: Vec<usize> = (0..len).collect();
        let result = validate(items, &LENGTH_2_8);
        assert_eq!(result.is_ok(), ok, "length {len}");
        if let Err(violations) = result {
            assert!(matches!(
                violations.as_slice(),
                [ConstraintViolation::Length { actual, .. }] if *actual == len
            ));
        }
    }
}

#[test]
fn test_constrained_collection_end_to_end() {
    let shapes = ShapeList::try_from_items(strings(&["circle", "square"])).unwrap();
    assert_eq!(shapes.as_items(), ["circle", "square"]);

    let violations = ShapeList::try_from_items(strings(&["a", "a", "b", "c"])).unwrap_err();
    assert_eq!(violations.len(), 1);
    match &violations[0] {
        ConstraintViolation::UniqueItems {
            duplicates,
            original,
        } => {
            let got: HashSet<usize> = duplicates.iter().copied().collect();
            assert_eq!(got, HashSet::from([0, 1]));
            assert_eq!(original, &strings(&["a", "a", "b", "c"]));
        }
        other => panic!("unexpected violation: {other}"),
    }

    // Too short and repeated: both reported, length first.
    let violations = ShapeList::try_from_items(strings(&["x"; 9])).unwrap_err();
    let kinds: Vec<&str> = violations.iter().map(ConstraintViolation::kind).collect();
    assert_eq!(kinds, ["length", "uniqueItems"]);
}

#[test]
fn test_validation_exception_document() {
    let violations = ShapeList::try_from_items(strings(&["x"; 9])).unwrap_err();
    let exception = ValidationException::from_violations(&violations, "/shapes").unwrap();
    let doc = serde_json::to_value(&exception).unwrap();

    assert_eq!(
        doc["message"],
        "2 validation errors detected. Value with length 9 at '/shapes' failed to satisfy constraint: Member must have length between 2 and 8, inclusive"
    );
    let fields = doc["fieldList"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1]["path"], "/shapes");
    assert!(fields[1]["message"]
        .as_str()
        .unwrap()
        .ends_with("failed to satisfy constraint: Member must have unique values"));
}

proptest! {
    #[test]
    fn prop_no_constraints_always_valid(items in prop::collection::vec(any::<u8>(), 0..64)) {
        let result = validate(items.clone(), &CollectionConstraints::new());
        prop_assert_eq!(result.ok(), Some(items));
    }

    #[test]
    fn prop_distinct_items_never_violate_uniqueness(
        set in prop::collection::hash_set(any::<u32>(), 0..64)
    ) {
        let items: Vec<u32> = set.into_iter().collect();
        prop_assert!(duplicate_indices(&items).is_empty());
        prop_assert!(validate(items, &UNIQUE).is_ok());
    }

    #[test]
    fn prop_duplicates_identify_exactly_the_repeated_values(
        items in prop::collection::vec(0u8..8, 0..48)
    ) {
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for item in &items {
            *counts.entry(*item).or_default() += 1;
        }
        let repeated: HashSet<u8> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(value, _)| *value)
            .collect();

        let duplicates = duplicate_indices(&items);
        if repeated.is_empty() {
            prop_assert!(duplicates.is_empty());
        } else {
            prop_assert!(duplicates.len() >= 2);
            prop_assert!(duplicates.iter().all(|&i| i < items.len()));
            let classes: HashSet<u8> = duplicates.iter().map(|&i| items[i]).collect();
            prop_assert_eq!(classes, repeated);
        }
    }

    #[test]
    fn prop_every_occurrence_of_a_repeated_value_is_reported(
        items in prop::collection::vec(0u8..6, 0..32)
    ) {
        let duplicates: HashSet<usize> = duplicate_indices(&items).into_iter().collect();
        for (i, item) in items.iter().enumerate() {
            let occurrences = items.iter().filter(|other| *other == item).count();
            prop_assert_eq!(duplicates.contains(&i), occurrences > 1);
        }
    }

    #[test]
    fn prop_validation_is_idempotent(items in prop::collection::vec(0u16..16, 0..40)) {
        let constraints = CollectionConstraints::new()
            .with_length(LengthBound::at_most(20))
            .with_unique_items();
        let first = format!("{:?}", validate(items.clone(), &constraints));
        let second = format!("{:?}", validate(items.clone(), &constraints));
        prop_assert_eq!(first, second);
        prop_assert_eq!(duplicate_indices(&items), duplicate_indices(&items));
    }
}
