//! Tests for EventStreamPump: ordering, stop, double attach, failure policy.

use std::sync::Arc;
use std::time::Duration;

use hostio_core::{BridgeError, BridgeResult, ErrorKind, HostErrorCode};
use hostio_lifecycle::{
    Cancellable, CancellationToken, CollectingDiagnostics, DiagnosticSink, EventStreamPump,
    PumpExit, PumpPolicy,
};
use test_fixtures::{wait_until, Recorder, EVENT_TIMEOUT, SETTLE_DELAY};
use tokio::sync::mpsc;

type Source = mpsc::Receiver<BridgeResult<u32>>;

fn pump_with(
    policy: PumpPolicy,
) -> (
    EventStreamPump<Source>,
    mpsc::Sender<BridgeResult<u32>>,
    CancellationToken,
    Arc<CollectingDiagnostics>,
) {
    let (tx, rx) = mpsc::channel(16);
    let closed = CancellationToken::new();
    let diagnostics = Arc::new(CollectingDiagnostics::new(8));
    let sink: Arc<dyn DiagnosticSink> = diagnostics.clone();
    let pump = EventStreamPump::new("watcher#test", rx, closed.clone(), policy, sink);
    (pump, tx, closed, diagnostics)
}

#[tokio::test]
async fn events_are_delivered_in_source_order() {
    let (pump, tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();

    for i in 0..10 {
        tx.send(Ok(i)).await.unwrap();
    }
    assert!(wait_until(EVENT_TIMEOUT, || recorder.len() == 10).await);
    assert_eq!(recorder.items(), (0..10).collect::<Vec<_>>());
    sub.stop();
}

#[tokio::test]
async fn no_handler_invocation_after_stop() {
    let (pump, tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();

    tx.send(Ok(1)).await.unwrap();
    assert!(wait_until(EVENT_TIMEOUT, || recorder.len() == 1).await);

    let exit = sub.stop_and_wait().await.unwrap();
    assert_eq!(exit, PumpExit::Stopped);

    tx.send(Ok(2)).await.unwrap();
    tx.send(Ok(3)).await.unwrap();
    tokio::time::sleep(SETTLE_DELAY).await;
    assert_eq!(recorder.items(), vec![1]);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (pump, _tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let sub = pump.attach(|_| {}).unwrap();
    sub.stop();
    sub.stop();
    sub.stop_handle().stop();
    assert_eq!(sub.finished().wait().await.unwrap(), PumpExit::Stopped);
}

#[tokio::test]
async fn second_attach_while_active_is_rejected() {
    let (pump, _tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let sub = pump.attach(|_| {}).unwrap();

    let err = pump.attach(|_| {}).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.error_code(), "ALREADY_ATTACHED");
    assert!(pump.is_attached());

    sub.stop_and_wait().await.unwrap();
    assert!(!pump.is_attached());
}

#[tokio::test]
async fn a_stopped_pump_can_be_reattached_and_resumes_the_source() {
    let (pump, tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let first = Recorder::new();
    let sub = pump.attach(first.handler()).unwrap();
    sub.stop_and_wait().await.unwrap();

    tx.send(Ok(7)).await.unwrap();
    let second = Recorder::new();
    let sub = pump.attach(second.handler()).unwrap();
    assert!(wait_until(EVENT_TIMEOUT, || second.len() == 1).await);
    assert_eq!(second.items(), vec![7]);
    assert!(first.is_empty());
    sub.stop();
}

#[tokio::test]
async fn exhausted_source_settles_and_cannot_be_reattached() {
    let (pump, tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();
    tx.send(Ok(1)).await.unwrap();
    drop(tx);

    assert_eq!(sub.finished().wait().await.unwrap(), PumpExit::Exhausted);
    assert_eq!(recorder.items(), vec![1]);
    let err = pump.attach(|_| {}).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
}

#[tokio::test]
async fn closing_the_owner_stops_the_pump_and_blocks_reattach() {
    let (pump, tx, closed, _) = pump_with(PumpPolicy::StopOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();

    closed.cancel();
    assert_eq!(sub.finished().wait().await.unwrap(), PumpExit::Stopped);
    let _ = tx.send(Ok(9)).await;
    tokio::time::sleep(SETTLE_DELAY).await;
    assert!(recorder.is_empty());

    let err = pump.attach(|_| {}).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
}

// ── Failures ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn source_failure_is_reported_and_stops_by_default() {
    let (pump, tx, _closed, diagnostics) = pump_with(PumpPolicy::StopOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();

    tx.send(Ok(1)).await.unwrap();
    tx.send(Err(BridgeError::io("watch", "queue overflow")))
        .await
        .unwrap();
    tx.send(Ok(2)).await.unwrap();

    let exit = sub.finished().wait().await.unwrap();
    assert!(matches!(exit, PumpExit::Failed(ref e) if e.kind() == ErrorKind::IoFailure));
    assert_eq!(recorder.items(), vec![1]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.snapshot()[0].source, "watcher#test");
}

#[tokio::test]
async fn continue_policy_keeps_pumping_after_a_failure() {
    let (pump, tx, _closed, diagnostics) = pump_with(PumpPolicy::ContinueOnError);
    let recorder = Recorder::new();
    let sub = pump.attach(recorder.handler()).unwrap();

    tx.send(Ok(1)).await.unwrap();
    tx.send(Err(BridgeError::io("watch", "transient")))
        .await
        .unwrap();
    tx.send(Ok(2)).await.unwrap();

    assert!(wait_until(EVENT_TIMEOUT, || recorder.len() == 2).await);
    assert_eq!(recorder.items(), vec![1, 2]);
    assert_eq!(diagnostics.total_reported(), 1);
    sub.stop();
}

#[tokio::test]
async fn aborted_failure_after_stop_is_swallowed() {
    let (pump, tx, closed, diagnostics) = pump_with(PumpPolicy::StopOnError);
    let sub = pump.attach(|_| {}).unwrap();
    closed.cancel();
    let _ = tx.send(Err(BridgeError::aborted("watch"))).await;
    sub.finished().wait().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn aborted_failure_without_stop_is_reportable() {
    let (pump, tx, _closed, diagnostics) = pump_with(PumpPolicy::StopOnError);
    let sub = pump.attach(|_| {}).unwrap();
    tx.send(Err(BridgeError::aborted("watch"))).await.unwrap();
    let exit = sub.finished().wait().await.unwrap();
    assert!(matches!(exit, PumpExit::Failed(ref e) if e.is_aborted()));
    assert_eq!(diagnostics.len(), 1);
}

#[tokio::test]
async fn handler_panic_settles_as_aborted_and_frees_the_pump() {
    let (pump, tx, _closed, _) = pump_with(PumpPolicy::StopOnError);
    let sub = pump.attach(|_| panic!("handler blew up")).unwrap();

    tx.send(Ok(1)).await.unwrap();
    let err = sub.finished().wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Aborted);
    assert!(wait_until(EVENT_TIMEOUT, || !pump.is_attached()).await);
}
