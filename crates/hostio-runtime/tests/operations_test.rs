//! Consistency checks over the canonical operation table.

use std::collections::HashSet;

use hostio_runtime::operations::OPERATIONS;
use hostio_runtime::{OperationTable, OperationVariant};

#[test]
fn qualified_names_are_unique() {
    let mut seen = HashSet::new();
    for spec in OPERATIONS {
        assert!(seen.insert(spec.qualified_name()), "{}", spec.qualified_name());
    }
    assert_eq!(OperationTable::new().len(), OPERATIONS.len());
}

#[test]
fn every_sync_twin_names_an_async_operation() {
    let table = OperationTable::new();
    for spec in table.iter().filter(|s| s.name.ends_with("_sync")) {
        assert_eq!(spec.variant, OperationVariant::Sync);
        let base = table
            .async_counterpart(&spec.qualified_name())
            .unwrap_or_else(|| panic!("{} has no async twin", spec.qualified_name()));
        assert_eq!(base.args, spec.args);
        assert_eq!(base.result, spec.result);
    }
}

#[test]
fn lookup_and_sync_counterpart() {
    let table = OperationTable::new();
    let read = table.lookup("fs.read_file").unwrap();
    assert_eq!(read.variant, OperationVariant::Async);
    assert_eq!(read.args, &["path"]);
    assert_eq!(
        table.sync_counterpart("fs.read_file").unwrap().name,
        "read_file_sync"
    );
    assert!(table.sync_counterpart("fs.read_file_sync").is_none());
    assert!(table.sync_counterpart("net.serve").is_none());
    assert!(table.lookup("fs.nope").is_none());
}

#[test]
fn every_fs_one_shot_has_a_blocking_twin() {
    let table = OperationTable::new();
    let fs = table.module("fs");
    let async_ops: Vec<_> = fs
        .iter()
        .filter(|s| s.variant == OperationVariant::Async)
        .collect();
    assert_eq!(async_ops.len(), 23);
    for spec in async_ops {
        assert!(
            table.sync_counterpart(&spec.qualified_name()).is_some(),
            "{}",
            spec.name
        );
    }
}
