//! Decoration table tests

use crate::decoration::{DecorationTable, MetricDecoration};
use crate::error::ModelError;

fn decoration(category: &str, name: &str, rename: Option<&str>, unit: Option<&str>) -> MetricDecoration {
    MetricDecoration {
        category: category.to_string(),
        name: name.to_string(),
        rename: rename.map(str::to_string),
        unit: unit.map(str::to_string),
    }
}

#[test]
fn test_rename_hit_wins() {
    let table =
        DecorationTable::new(&[decoration("cpu", "usage_idle", Some("CPU_IDLE"), None)]).unwrap();

    assert_eq!(table.decorate_name("cpu", "usage_idle"), "CPU_IDLE");
}

#[test]
fn test_value_field_collapses_to_category() {
    let table = DecorationTable::default();
    assert_eq!(table.decorate_name("procs", "value"), "procs");
}

#[test]
fn test_miss_joins_category_and_name() {
    let table = DecorationTable::default();
    let decorated = table.decorate_name("cpu", "usage_idle");

    if cfg!(windows) {
        assert_eq!(decorated, "cpu usage_idle");
    } else {
        assert_eq!(decorated, "cpu_usage_idle");
    }
}

#[test]
fn test_unit_hit() {
    let table =
        DecorationTable::new(&[decoration("net", "bytes_sent", None, Some("Bytes"))]).unwrap();

    assert_eq!(table.decorate_unit("net", "bytes_sent"), Some("Bytes"));
}

#[test]
fn test_unit_miss_returns_none() {
    let table = DecorationTable::default();
    assert_eq!(table.decorate_unit("net", "bytes_sent"), None);
}

#[test]
fn test_unsupported_unit_is_rejected() {
    let err = DecorationTable::new(&[decoration("net", "bytes_sent", None, Some("Furlongs"))])
        .unwrap_err();

    match err {
        ModelError::UnsupportedUnit { unit, category, name } => {
            assert_eq!(unit, "Furlongs");
            assert_eq!(category, "net");
            assert_eq!(name, "bytes_sent");
        }
    }
}

#[test]
fn test_rename_and_unit_on_same_rule() {
    let table = DecorationTable::new(&[decoration(
        "disk",
        "used_percent",
        Some("DISK_USED"),
        Some("Percent"),
    )])
    .unwrap();

    assert_eq!(table.decorate_name("disk", "used_percent"), "DISK_USED");
    assert_eq!(table.decorate_unit("disk", "used_percent"), Some("Percent"));
}
