//! Scenario tests for the filesystem change watcher.

use std::path::Path;

use hostio_core::{ErrorKind, HostioConfig};
use hostio_fs::{watch_fs, FsEvent, FsEventKind};
use hostio_lifecycle::{ProcessContext, PumpExit, ResourceHandle};
use test_fixtures::{wait_until, Recorder, TempWorkspace, EVENT_TIMEOUT, SETTLE_DELAY};

fn creations_of(events: &[FsEvent], name: &str) -> usize {
    events
        .iter()
        .filter(|e| e.kind == FsEventKind::Create)
        .filter(|e| e.paths.iter().any(|p| p.file_name() == Some(name.as_ref())))
        .count()
}

fn ctx() -> ProcessContext {
    ProcessContext::new(HostioConfig::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn create_yields_one_event_and_stop_silences_the_pump() {
    let ws = TempWorkspace::new();
    let ctx = ctx();
    let watcher = watch_fs(&ctx, &[ws.path()], None).unwrap();
    let recorder = Recorder::new();
    let sub = watcher.watch(recorder.handler()).unwrap();

    std::fs::write(ws.join("a.txt"), "a").unwrap();
    assert!(wait_until(EVENT_TIMEOUT, || creations_of(&recorder.items(), "a.txt") >= 1).await);
    tokio::time::sleep(SETTLE_DELAY).await;
    assert_eq!(creations_of(&recorder.items(), "a.txt"), 1);

    let created = recorder
        .items()
        .into_iter()
        .find(|e| e.kind == FsEventKind::Create)
        .unwrap();
    assert!(created
        .paths
        .iter()
        .any(|p| p.file_name() == Some(Path::new("a.txt").as_os_str())));

    assert_eq!(sub.stop_and_wait().await.unwrap(), PumpExit::Stopped);
    let seen = recorder.len();
    std::fs::write(ws.join("b.txt"), "b").unwrap();
    std::fs::write(ws.join("c.txt"), "c").unwrap();
    tokio::time::sleep(SETTLE_DELAY).await;
    assert_eq!(recorder.len(), seen);

    watcher.close().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_stops_an_attached_pump_and_releases_keep_alive() {
    let ws = TempWorkspace::new();
    let ctx = ctx();
    let watcher = watch_fs(&ctx, &[ws.path()], Some(false)).unwrap();
    assert_eq!(ctx.keep_alive().active_count(), 1);

    let sub = watcher.watch(|_| {}).unwrap();
    watcher.close().unwrap();
    watcher.close().unwrap();

    assert_eq!(sub.finished().wait().await.unwrap(), PumpExit::Stopped);
    assert!(ctx.keep_alive().is_idle());
    let err = watcher.watch(|_| {}).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_watch_while_pumping_is_rejected() {
    let ws = TempWorkspace::new();
    let ctx = ctx();
    let watcher = watch_fs(&ctx, &[ws.path()], None).unwrap();
    let _sub = watcher.watch(|_| {}).unwrap();
    let err = watcher.watch(|_| {}).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    watcher.close().unwrap();
}

#[tokio::test]
async fn watching_a_missing_path_is_not_found() {
    let ws = TempWorkspace::new();
    let ctx = ctx();
    let err = watch_fs(&ctx, &[ws.join("missing")], None).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(ctx.keep_alive().is_idle());
}

#[tokio::test]
async fn empty_path_list_is_invalid() {
    let ctx = ctx();
    let paths: [&Path; 0] = [];
    let err = watch_fs(&ctx, &paths, None).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn notify_kinds_map_to_coarse_kinds() {
    use notify::event::{CreateKind, ModifyKind, RenameMode};
    use notify::EventKind;

    assert_eq!(
        FsEventKind::from(&EventKind::Create(CreateKind::File)),
        FsEventKind::Create
    );
    assert_eq!(
        FsEventKind::from(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
        FsEventKind::Rename
    );
    assert_eq!(
        FsEventKind::from(&EventKind::Modify(ModifyKind::Any)),
        FsEventKind::Modify
    );
    assert_eq!(FsEventKind::Remove.as_str(), "remove");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stopped_watcher_counts_events_dropped_by_a_full_queue() {
    let ws = TempWorkspace::new();
    let config = HostioConfig::from_toml("[watch]\nevent_buffer = 2\n").unwrap();
    let ctx = ProcessContext::new(config);
    let watcher = watch_fs(&ctx, &[ws.path()], Some(false)).unwrap();
    let sub = watcher.watch(|_| {}).unwrap();
    sub.stop_and_wait().await.unwrap();

    for i in 0..20 {
        std::fs::write(ws.join(&format!("f{i}.txt")), "x").unwrap();
    }
    assert!(wait_until(EVENT_TIMEOUT, || watcher.dropped_events() > 0).await);
    assert!(!watcher.is_watching());
    watcher.close().unwrap();
}
