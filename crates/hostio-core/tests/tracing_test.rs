//! Tests for hostio tracing setup.

use std::sync::Mutex;

use hostio_core::tracing::init_tracing;

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn per_target_filter_is_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("HOSTIO_LOG", "hostio_fs=debug,hostio_net=warn");
    init_tracing();
    std::env::remove_var("HOSTIO_LOG");
}

#[test]
fn init_tracing_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn invalid_filter_falls_back_to_default() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("HOSTIO_LOG", "[[not a filter");
    init_tracing();
    std::env::remove_var("HOSTIO_LOG");
}
