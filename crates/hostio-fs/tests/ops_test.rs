//! Tests for one-shot filesystem operations and their blocking twins.

use std::time::{Duration, SystemTime};

use hostio_core::ErrorKind;
use hostio_fs::{ops, ops_sync, MakeTempOptions, MkdirOptions, OpenOptions, WriteFileOptions};
use proptest::prelude::*;
use test_fixtures::TempWorkspace;

#[tokio::test]
async fn write_then_read_text() {
    let ws = TempWorkspace::new();
    let path = ws.join("note.txt");
    ops::write_text_file(&path, "hello", &WriteFileOptions::default())
        .await
        .unwrap();
    ops::write_text_file(&path, " world", &WriteFileOptions::append())
        .await
        .unwrap();
    assert_eq!(ops::read_text_file(&path).await.unwrap(), "hello world");
    assert_eq!(ops_sync::read_file_sync(&path).unwrap(), b"hello world");
}

#[tokio::test]
async fn write_without_create_fails_on_missing_file() {
    let ws = TempWorkspace::new();
    let err = ops::write_file(ws.join("absent"), b"x", &WriteFileOptions::create(false))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn create_new_refuses_existing_files() {
    let ws = TempWorkspace::new();
    let path = ws.write("exists.txt", "x");
    let err = ops::write_file(&path, b"y", &WriteFileOptions::create_new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn read_missing_file_is_not_found_with_op_name() {
    let ws = TempWorkspace::new();
    let err = ops::read_file(ws.join("nope")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().starts_with("read_file"));
}

#[tokio::test]
async fn mkdir_read_dir_and_remove() {
    let ws = TempWorkspace::new();
    let nested = ws.join("a/b/c");
    let err = ops::mkdir(&nested, &MkdirOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    ops::mkdir(&nested, &MkdirOptions::recursive()).await.unwrap();
    ws.write("a/z.txt", "z");
    let entries = ops::read_dir(ws.join("a")).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["b", "z.txt"]);
    assert!(entries[0].is_directory && entries[1].is_file);

    assert!(ops::remove(ws.join("a"), false).await.is_err());
    ops::remove(ws.join("a"), true).await.unwrap();
    assert!(!ws.join("a").exists());
}

#[tokio::test]
async fn rename_copy_and_link() {
    let ws = TempWorkspace::new();
    let src = ws.write("src.txt", "data");
    ops::copy_file(&src, ws.join("copy.txt")).await.unwrap();
    ops::rename(&src, ws.join("moved.txt")).await.unwrap();
    ops::link(ws.join("moved.txt"), ws.join("hard.txt")).await.unwrap();
    assert_eq!(ops::read_text_file(ws.join("copy.txt")).await.unwrap(), "data");
    assert_eq!(ops::read_text_file(ws.join("hard.txt")).await.unwrap(), "data");
    assert!(!src.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_stat_lstat_and_read_link() {
    let ws = TempWorkspace::new();
    let target = ws.write("target.txt", "1234");
    let link = ws.join("link");
    ops::symlink(&target, &link).await.unwrap();

    assert!(ops::lstat(&link).await.unwrap().is_symlink);
    let info = ops::stat(&link).await.unwrap();
    assert!(info.is_file && !info.is_symlink);
    assert_eq!(info.size, 4);
    assert_eq!(ops::read_link(&link).await.unwrap(), target);
    assert_eq!(
        ops::real_path(&link).await.unwrap(),
        std::fs::canonicalize(&target).unwrap()
    );
}

#[cfg(unix)]
#[tokio::test]
async fn chmod_sets_permission_bits() {
    let ws = TempWorkspace::new();
    let path = ws.write("perm.txt", "");
    ops::chmod(&path, 0o600).await.unwrap();
    let mode = ops::stat(&path).await.unwrap().mode.unwrap();
    assert_eq!(mode & 0o777, 0o600);
    ops::chown(&path, None, None).await.unwrap();
}

#[tokio::test]
async fn truncate_and_utime() {
    let ws = TempWorkspace::new();
    let path = ws.write("t.txt", "0123456789");
    ops::truncate(&path, Some(4)).await.unwrap();
    assert_eq!(ops::read_text_file(&path).await.unwrap(), "0123");
    ops_sync::truncate_sync(&path, None).unwrap();
    assert_eq!(ops::stat(&path).await.unwrap().size, 0);

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    ops::utime(&path, when, when).await.unwrap();
    let mtime = ops::stat(&path).await.unwrap().mtime.unwrap();
    assert_eq!(mtime.timestamp(), 1_000_000_000);
}

#[tokio::test]
async fn temp_entries_honor_prefix_suffix_and_dir() {
    let ws = TempWorkspace::new();
    let options = MakeTempOptions::dir(ws.path())
        .combine(MakeTempOptions::prefix("pre-"))
        .combine(MakeTempOptions::suffix(".tmp"));
    let file = ops::make_temp_file(&options).await.unwrap();
    let dir = ops_sync::make_temp_dir_sync(&options).unwrap();

    for path in [&file, &dir] {
        assert_eq!(path.parent().unwrap(), ws.path());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("pre-") && name.ends_with(".tmp"), "{name}");
    }
    assert!(file.is_file() && dir.is_dir());
    assert_ne!(file, dir);
}

#[test]
fn open_options_default_to_read_only() {
    let ws = TempWorkspace::new();
    let path = ws.write("ro.txt", "abc");
    let file = ops_sync::open_sync(&path, &OpenOptions::default()).unwrap();
    assert_eq!(file.read_sync(8).unwrap(), Some(b"abc".to_vec()));
    assert!(file.write_sync(b"x").is_err());
}

// ── Option records ───────────────────────────────────────────────────────

fn open_options() -> impl Strategy<Value = OpenOptions> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(0u32..0o777),
    )
        .prop_map(|(read, write, create, mode)| OpenOptions {
            read,
            write,
            create,
            mode,
            ..OpenOptions::default()
        })
}

proptest! {
    #[test]
    fn combine_is_right_biased(a in open_options(), b in open_options()) {
        let merged = a.clone().combine(b.clone());
        prop_assert_eq!(merged.read, b.read.or(a.read));
        prop_assert_eq!(merged.write, b.write.or(a.write));
        prop_assert_eq!(merged.mode, b.mode.or(a.mode));
    }

    #[test]
    fn combine_with_empty_is_identity(a in open_options()) {
        prop_assert_eq!(a.clone().combine(OpenOptions::default()), a.clone());
        prop_assert_eq!(OpenOptions::default().combine(a.clone()), a);
    }
}
