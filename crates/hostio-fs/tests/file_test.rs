//! Tests for the FsFile handle.

use std::sync::Arc;

use hostio_core::ErrorKind;
use hostio_fs::{ops, OpenOptions, SeekMode};
use hostio_lifecycle::ResourceHandle;
use test_fixtures::TempWorkspace;

#[tokio::test]
async fn write_seek_read_round_trip_on_one_cursor() {
    let ws = TempWorkspace::new();
    let file = ops::create(ws.join("f.bin")).await.unwrap();
    assert_eq!(file.write(b"hello world").await.unwrap(), 11);

    assert_eq!(file.seek(6, SeekMode::Start).await.unwrap(), 6);
    assert_eq!(file.read(5).await.unwrap(), Some(b"world".to_vec()));
    assert_eq!(file.read(5).await.unwrap(), None);

    assert_eq!(file.seek_sync(-5, SeekMode::End).unwrap(), 6);
    assert_eq!(file.read_sync(2).unwrap(), Some(b"wo".to_vec()));
    assert_eq!(file.seek(0, SeekMode::Current).await.unwrap(), 8);
}

#[tokio::test]
async fn negative_offset_from_start_is_invalid() {
    let ws = TempWorkspace::new();
    let file = ops::create(ws.join("f")).await.unwrap();
    let err = file.seek(-1, SeekMode::Start).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn stat_truncate_and_sync() {
    let ws = TempWorkspace::new();
    let path = ws.write("s.txt", "12345678");
    let options = OpenOptions::read().combine(OpenOptions::write());
    let file = ops::open(&path, &options).await.unwrap();

    assert_eq!(file.stat().await.unwrap().size, 8);
    file.truncate(Some(3)).await.unwrap();
    file.sync().await.unwrap();
    file.sync_data_sync().unwrap();
    assert_eq!(file.stat_sync().unwrap().size, 3);
    assert!(!file.is_terminal().unwrap());
}

#[tokio::test]
async fn closed_file_rejects_operations_and_closes_idempotently() {
    let ws = TempWorkspace::new();
    let file = ops::create(ws.join("c")).await.unwrap();
    file.close().unwrap();
    file.close().unwrap();
    assert_eq!(file.read(1).await.unwrap_err().kind(), ErrorKind::AlreadyClosed);
    assert_eq!(file.write_sync(b"x").unwrap_err().kind(), ErrorKind::AlreadyClosed);
}

#[tokio::test]
async fn files_never_hold_the_process_open() {
    let ws = TempWorkspace::new();
    let file = Arc::new(ops::create(ws.join("k")).await.unwrap());
    file.ref_();
    assert!(!file.has_ref());
}
