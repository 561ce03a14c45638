//! Tests for abortable stream handles.

use std::sync::Arc;
use std::time::Duration;

use hostio_core::ErrorKind;
use hostio_io::{write_sync, InputStream, OutputStream, StdTarget};
use hostio_lifecycle::ResourceHandle;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn reads_return_data_then_none_at_eof() {
    let (mut tx, rx) = tokio::io::duplex(64);
    let input = InputStream::new(rx);
    tx.write_all(b"hello").await.unwrap();
    drop(tx);

    assert_eq!(input.read(16).await.unwrap(), Some(b"hello".to_vec()));
    assert_eq!(input.read(16).await.unwrap(), None);
}

#[tokio::test]
async fn read_to_end_collects_everything() {
    let (mut tx, rx) = tokio::io::duplex(8);
    let input = InputStream::new(rx).with_chunk_size(4);
    let writer = tokio::spawn(async move {
        tx.write_all(b"a longer payload than the pipe").await.unwrap();
    });
    let all = input.read_to_end().await.unwrap();
    writer.await.unwrap();
    assert_eq!(all, b"a longer payload than the pipe");
}

#[tokio::test]
async fn output_stream_writes_reach_the_peer() {
    let (tx, mut rx) = tokio::io::duplex(64);
    let output = OutputStream::new(tx);
    output.write_all(b"ping").await.unwrap();
    output.flush().await.unwrap();
    output.shutdown().await.unwrap();
    assert!(output.is_closed());

    let mut received = Vec::new();
    rx.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"ping");
}

#[tokio::test]
async fn close_during_a_pending_read_fires_exactly_once_with_aborted() {
    let (_tx, rx) = tokio::io::duplex(64);
    let input = Arc::new(InputStream::new(rx));

    let pending = {
        let input = input.clone();
        tokio::spawn(async move { input.read(16).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    input.close().unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(1), pending)
        .await
        .expect("read did not observe close")
        .unwrap();
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Aborted);
}

#[tokio::test]
async fn operations_after_close_report_already_closed() {
    let (tx, _rx) = tokio::io::duplex(64);
    let output = OutputStream::new(tx);
    output.close().unwrap();
    output.close().unwrap();
    let err = output.write(b"x").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
}

#[test]
fn write_sync_to_stderr_reports_length() {
    assert_eq!(write_sync(StdTarget::Stderr, b"").unwrap(), 0);
}
