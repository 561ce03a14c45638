//! Tests for the hostio error taxonomy.

use std::collections::HashSet;
use std::io;

use hostio_core::errors::error_code;
use hostio_core::errors::*;
use proptest::prelude::*;

#[test]
fn io_kinds_map_onto_the_taxonomy() {
    let cases = [
        (io::ErrorKind::NotFound, ErrorKind::NotFound),
        (io::ErrorKind::PermissionDenied, ErrorKind::PermissionDenied),
        (io::ErrorKind::AlreadyExists, ErrorKind::AlreadyExists),
        (io::ErrorKind::InvalidInput, ErrorKind::InvalidArgument),
        (io::ErrorKind::BrokenPipe, ErrorKind::IoFailure),
        (io::ErrorKind::UnexpectedEof, ErrorKind::IoFailure),
    ];
    for (io_kind, expected) in cases {
        let err = BridgeError::from_io("stat", io::Error::new(io_kind, "boom"));
        assert_eq!(err.kind(), expected, "io kind {io_kind:?}");
    }
}

#[test]
fn every_kind_has_a_distinct_code() {
    let codes: HashSet<&str> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
    assert_eq!(codes.len(), ErrorKind::ALL.len());
}

#[test]
fn double_attach_is_an_invalid_argument_with_its_own_code() {
    let err = BridgeError::already_attached("watcher#3");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.error_code(), error_code::ALREADY_ATTACHED);
}

#[test]
fn napi_string_prefixes_the_code() {
    let err = BridgeError::already_closed("file#1");
    assert_eq!(err.napi_string(), "[ALREADY_CLOSED] file#1 is already closed");

    let config = ConfigError::FileNotFound {
        path: "/nowhere".into(),
    };
    assert!(config.napi_string().starts_with("[CONFIG_ERROR]"));
}

#[test]
fn predicates_match_variants() {
    assert!(BridgeError::aborted("read").is_aborted());
    assert!(!BridgeError::aborted("read").is_already_closed());
    assert!(BridgeError::already_closed("server#1").is_already_closed());
}

#[test]
fn errors_are_cloneable_for_broadcast() {
    let err = BridgeError::from_io("open", io::Error::new(io::ErrorKind::NotFound, "missing"));
    let copy = err.clone();
    assert_eq!(err, copy);
    assert!(copy.to_string().contains("open"));
}

proptest! {
    #[test]
    fn from_io_keeps_message_and_op(op in "[a-z_]{1,16}", message in "[ -~]{0,40}") {
        let err = BridgeError::from_io(op.clone(), io::Error::new(io::ErrorKind::Other, message.clone()));
        prop_assert_eq!(err.kind(), ErrorKind::IoFailure);
        let rendered = err.to_string();
        prop_assert!(rendered.starts_with(&op));
        prop_assert!(rendered.ends_with(&message));
    }
}
