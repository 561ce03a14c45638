//! Tests for environment access and system info.

use std::sync::Mutex;

use hostio_core::{ErrorKind, HostioConfig};
use hostio_lifecycle::ProcessContext;
use hostio_runtime::{args, build, chdir, cwd, exec_path, hostname, pid, ppid, Env};
use test_fixtures::TempWorkspace;

/// Serializes tests that touch the working directory.
static CWD_MUTEX: Mutex<()> = Mutex::new(());

// ---- Env ----

#[test]
fn set_get_has_delete() {
    let env = Env;
    let key = "HOSTIO_ENV_TEST_ROUND";
    env.set(key, "value").unwrap();
    assert_eq!(env.get(key).unwrap().as_deref(), Some("value"));
    assert!(env.has(key).unwrap());
    assert_eq!(env.to_object().get(key).map(String::as_str), Some("value"));

    env.delete(key).unwrap();
    assert_eq!(env.get(key).unwrap(), None);
    assert!(!env.has(key).unwrap());
    env.delete(key).unwrap();
}

#[test]
fn invalid_keys_are_rejected() {
    let env = Env;
    for key in ["", "A=B", "NUL\0KEY"] {
        let err = env.get(key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{key:?}");
    }
    let err = env.set("HOSTIO_ENV_TEST_NUL", "a\0b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ---- system info ----

#[test]
fn cwd_and_chdir_round_trip() {
    let _guard = CWD_MUTEX.lock().unwrap();
    let original = cwd().unwrap();
    let ws = TempWorkspace::new();
    chdir(ws.path()).unwrap();
    assert_eq!(cwd().unwrap(), ws.canonical());
    chdir(&original).unwrap();
    assert_eq!(cwd().unwrap(), original);
}

#[test]
fn chdir_to_missing_directory_is_not_found() {
    let ws = TempWorkspace::new();
    let err = chdir(ws.join("missing")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn process_identity_is_reported() {
    assert_eq!(pid(), std::process::id());
    assert!(exec_path().unwrap().is_absolute());
    let _ = args();
    assert_eq!(build().os, std::env::consts::OS);
}

#[cfg(unix)]
#[test]
fn unix_identity_matches_nix() {
    assert_eq!(ppid(), nix::unistd::getppid().as_raw() as u32);
    assert!(!hostname().unwrap().is_empty());
    assert!(!hostio_runtime::os_release().unwrap().is_empty());
    assert_eq!(hostio_runtime::uid(), Some(nix::unistd::getuid().as_raw()));
    assert_eq!(hostio_runtime::gid(), Some(nix::unistd::getgid().as_raw()));
}

#[test]
fn exit_code_lives_on_the_context() {
    let ctx = ProcessContext::new(HostioConfig::default());
    assert_eq!(ctx.exit_code(), 0);
    ctx.set_exit_code(3);
    assert_eq!(ctx.clone().exit_code(), 3);
}
