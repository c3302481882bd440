//! Dimension construction tests

use std::collections::BTreeMap;

use crate::datum::StorageResolution;
use crate::dimensions::{build_dimensions, take_storage_resolution};
use crate::{HIGH_RESOLUTION_TAG, MAX_DIMENSIONS};

fn tag_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_host_is_always_first() {
    let tags = tag_map(&[("zone", "a"), ("host", "h1"), ("app", "web")]);
    let dims = build_dimensions(&tags);

    assert_eq!(dims.len(), 3);
    assert_eq!(dims[0].name, "host");
    assert_eq!(dims[0].value, "h1");
    assert_eq!(dims[1].name, "app");
    assert_eq!(dims[2].name, "zone");
}

#[test]
fn test_empty_host_is_skipped() {
    let tags = tag_map(&[("host", ""), ("app", "web")]);
    let dims = build_dimensions(&tags);

    assert_eq!(dims.len(), 1);
    assert_eq!(dims[0].name, "app");
}

#[test]
fn test_empty_values_are_skipped() {
    let tags = tag_map(&[("a", "1"), ("b", ""), ("c", "3")]);
    let dims = build_dimensions(&tags);

    assert_eq!(dims.len(), 2);
    assert_eq!(dims[0].name, "a");
    assert_eq!(dims[1].name, "c");
}

#[test]
fn test_alphabetical_order_without_host() {
    let tags = tag_map(&[("charlie", "3"), ("alpha", "1"), ("bravo", "2")]);
    let dims = build_dimensions(&tags);

    let names: Vec<&str> = dims.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
}

#[test]
fn test_dimension_limit_keeps_host_and_first_29() {
    // 35 tags including host; expect host plus the alphabetically first 29
    // of the remaining 34.
    let mut tags = BTreeMap::new();
    tags.insert("host".to_string(), "h".to_string());
    for i in 0..34 {
        tags.insert(format!("tag{i:02}"), format!("v{i}"));
    }

    let dims = build_dimensions(&tags);
    assert_eq!(dims.len(), MAX_DIMENSIONS);
    assert_eq!(dims[0].name, "host");
    for (i, dim) in dims.iter().skip(1).enumerate() {
        assert_eq!(dim.name, format!("tag{i:02}"));
    }
}

#[test]
fn test_deterministic_for_same_input() {
    let tags = tag_map(&[("host", "h"), ("b", "2"), ("a", "1"), ("c", "3")]);

    let first = build_dimensions(&tags);
    let second = build_dimensions(&tags);
    assert_eq!(first, second);
}

#[test]
fn test_resolution_tag_is_consumed() {
    let mut tags = tag_map(&[("host", "h"), (HIGH_RESOLUTION_TAG, "true")]);

    let resolution = take_storage_resolution(&mut tags);
    assert_eq!(resolution, StorageResolution::High);
    assert!(!tags.contains_key(HIGH_RESOLUTION_TAG));

    // The consumed tag never becomes a dimension.
    let dims = build_dimensions(&tags);
    assert_eq!(dims.len(), 1);
    assert_eq!(dims[0].name, "host");
}

#[test]
fn test_resolution_tag_case_insensitive() {
    let mut tags = tag_map(&[(HIGH_RESOLUTION_TAG, "TRUE")]);
    assert_eq!(take_storage_resolution(&mut tags), StorageResolution::High);
}

#[test]
fn test_resolution_defaults_to_standard() {
    let mut tags = tag_map(&[("host", "h")]);
    assert_eq!(
        take_storage_resolution(&mut tags),
        StorageResolution::Standard
    );

    let mut tags = tag_map(&[(HIGH_RESOLUTION_TAG, "false")]);
    assert_eq!(
        take_storage_resolution(&mut tags),
        StorageResolution::Standard
    );
}
