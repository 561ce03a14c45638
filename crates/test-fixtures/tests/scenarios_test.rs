//! End-to-end lifecycle scenarios across every resource kind.

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use hostio_core::{ErrorKind, HostioConfig};
use hostio_fs::{ops, watch_fs, FsEventKind};
use hostio_lifecycle::{
    dispatch, CollectingDiagnostics, ErrorChannel, ProcessContext, PumpExit, ResourceHandle,
    ResourceKind,
};
use hostio_net::{serve, text, ServeOptions};
use hostio_process::{Command, CommandOptions};
use hostio_runtime::{set_interval, set_timeout, TimerExit};
use test_fixtures::{wait_until, Recorder, TempWorkspace, EVENT_TIMEOUT};
use tokio::runtime::Handle;

fn ctx() -> ProcessContext {
    ProcessContext::new(HostioConfig::default())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_all_releases_every_kind_of_resource() {
    let ctx = ctx();
    let ws = TempWorkspace::new();

    let watcher = Arc::new(watch_fs(&ctx, &[ws.path()], None).unwrap());
    let events = Recorder::new();
    let subscription = watcher.watch(events.handler()).unwrap();
    ctx.register(watcher.clone());

    let server = Arc::new(
        serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("ok") })
            .await
            .unwrap(),
    );
    ctx.register(server.clone());

    let child = Arc::new(
        Command::new("sleep", CommandOptions::args(["30"]))
            .spawn(&ctx)
            .unwrap(),
    );
    ctx.register(child.clone());

    let timeout = set_timeout(&ctx, Duration::from_secs(60)).unwrap();
    let interval = set_interval(&ctx, Duration::from_secs(60)).unwrap();

    assert_eq!(ctx.resources().len(), 5);
    assert_eq!(ctx.keep_alive().active_count(), 5);

    let visited = ctx.close_all();
    assert_eq!(visited, 5);
    let handles: [Arc<dyn ResourceHandle>; 5] = [
        watcher.clone(),
        server.clone(),
        child.clone(),
        timeout.clone(),
        interval.clone(),
    ];
    for handle in handles {
        assert!(handle.is_closed(), "{} still open", handle.kind());
    }

    tokio::time::timeout(EVENT_TIMEOUT, ctx.wait_until_idle())
        .await
        .unwrap();
    assert_eq!(
        subscription.finished().wait().await.unwrap(),
        PumpExit::Stopped
    );
    server.finished().wait().await.unwrap();
    let status = child.status().wait().await.unwrap();
    assert!(!status.success);
    assert_eq!(timeout.completion().wait().await, Ok(TimerExit::Cleared));
    assert!(ctx.resources().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn resources_that_end_on_their_own_leave_the_table() {
    let ctx = ctx();
    let child = Arc::new(
        Command::new("true", CommandOptions::default())
            .spawn(&ctx)
            .unwrap(),
    );
    ctx.register(child.clone());
    let server = Arc::new(
        serve(&ctx, ServeOptions::tcp("127.0.0.1", 0), || async { text("ok") })
            .await
            .unwrap(),
    );
    ctx.register(server.clone());
    let timeout = set_timeout(&ctx, Duration::from_millis(10)).unwrap();

    child.status().wait().await.unwrap();
    server.shutdown().await.unwrap();
    assert_eq!(timeout.completion().wait().await, Ok(TimerExit::Fired));

    assert!(wait_until(EVENT_TIMEOUT, || ctx.resources().is_empty()).await);
    assert!(ctx.keep_alive().is_idle());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unref_everything_and_the_context_is_idle_while_resources_live() {
    let ctx = ctx();
    let ws = TempWorkspace::new();
    let watcher = watch_fs(&ctx, &[ws.path()], Some(false)).unwrap();
    let child = Command::new("sleep", CommandOptions::args(["30"]))
        .spawn(&ctx)
        .unwrap();
    let timer = set_timeout(&ctx, Duration::from_secs(60)).unwrap();

    watcher.unref();
    child.unref();
    assert!(!ctx.keep_alive().is_idle());
    timer.unref();
    assert!(ctx.keep_alive().is_idle());
    tokio::time::timeout(EVENT_TIMEOUT, ctx.wait_until_idle())
        .await
        .unwrap();

    assert!(!watcher.is_closed());
    assert!(!child.is_closed());
    child.close().unwrap();
    watcher.close().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn write_through_dispatch_then_observe_with_a_watcher() {
    let ctx = ctx();
    let ws = TempWorkspace::new();
    let watcher = watch_fs(&ctx, &[ws.canonical()], Some(true)).unwrap();
    let events = Recorder::new();
    let _subscription = watcher.watch(events.handler()).unwrap();

    let target = ws.join("note.txt");
    let (channel, rx) = ErrorChannel::oneshot();
    dispatch(
        &Handle::current(),
        "write_text_file",
        async move { ops::write_text_file(target, "hello", &Default::default()).await },
        channel,
    );
    rx.await.unwrap().unwrap();

    assert!(
        wait_until(EVENT_TIMEOUT, || events
            .items()
            .iter()
            .any(|e| e.kind == FsEventKind::Create || e.kind == FsEventKind::Modify))
        .await
    );
    watcher.close().unwrap();
}

#[tokio::test]
async fn failures_without_a_continuation_reach_the_diagnostic_sink() {
    let sink = Arc::new(CollectingDiagnostics::new(8));
    let ctx = ProcessContext::with_diagnostics(HostioConfig::default(), sink.clone());
    let child = Arc::new(
        Command::new("sleep", CommandOptions::args(["30"]))
            .spawn(&ctx)
            .unwrap(),
    );
    ctx.register(child.clone());
    assert_eq!(child.kind(), ResourceKind::ChildProcess);

    // A close that fails natively is reported, not raised.
    struct Stubborn(hostio_lifecycle::HandleState);
    impl ResourceHandle for Stubborn {
        fn state(&self) -> &hostio_lifecycle::HandleState {
            &self.0
        }
        fn close_native(&self) -> hostio_core::BridgeResult<()> {
            Err(hostio_core::BridgeError::io("close", "device busy"))
        }
    }
    ctx.register(Arc::new(Stubborn(hostio_lifecycle::HandleState::new(
        ResourceKind::Stream,
        ctx.keep_alive(),
    ))));

    assert_eq!(ctx.close_all(), 2);
    let reported = sink.snapshot();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].error.kind(), ErrorKind::IoFailure);
    tokio::time::timeout(EVENT_TIMEOUT, ctx.wait_until_idle())
        .await
        .unwrap();
}
