//! Tests for one-shot commands, options and signal names.

#![cfg(unix)]

use hostio_core::ErrorKind;
use hostio_process::{Command, CommandOptions, Signal, StdioMode};
use proptest::prelude::*;
use test_fixtures::TempWorkspace;

fn sh(script: &str) -> Command {
    Command::new("sh", CommandOptions::args(["-c", script]))
}

// ---- output ----

#[tokio::test]
async fn output_collects_stdout_and_stderr() {
    let output = sh("printf out; printf err >&2").output().await.unwrap();
    assert!(output.status.success);
    assert_eq!(output.status.code, 0);
    assert_eq!(output.stdout, b"out");
    assert_eq!(output.stderr, b"err");
}

#[tokio::test]
async fn output_reports_nonzero_exit_without_error() {
    let output = sh("exit 7").output().await.unwrap();
    assert!(!output.status.success);
    assert_eq!(output.status.code, 7);
    assert_eq!(output.status.signal, None);
}

#[tokio::test]
async fn output_reports_signal_termination() {
    let output = sh("kill -TERM $$").output().await.unwrap();
    assert!(!output.status.success);
    assert_eq!(output.status.signal, Some(Signal::Sigterm));
    assert_eq!(output.status.code, 128 + 15);
}

#[tokio::test]
async fn missing_program_is_not_found() {
    let err = Command::new("hostio-no-such-program", CommandOptions::default())
        .output()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn output_respects_cwd_and_env() {
    let ws = TempWorkspace::new();
    let options = CommandOptions::args(["-c", "pwd; printf \"$GREETING\""])
        .combine(CommandOptions::cwd(ws.path()))
        .combine(CommandOptions::env("GREETING", "hi"));
    let output = Command::new("sh", options).output().await.unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let canonical = ws.canonical();
    assert!(stdout.starts_with(canonical.to_str().unwrap()), "{stdout}");
    assert!(stdout.ends_with("hi"), "{stdout}");
}

#[tokio::test]
async fn clear_env_drops_inherited_variables() {
    std::env::set_var("HOSTIO_COMMAND_TEST_MARKER", "present");
    let options = CommandOptions::args(["-c", "printf \"${HOSTIO_COMMAND_TEST_MARKER:-absent}\""])
        .combine(CommandOptions::clear_env());
    let output = Command::new("/bin/sh", options).output().await.unwrap();
    assert_eq!(output.stdout, b"absent");
}

#[tokio::test]
async fn non_piped_streams_come_back_empty() {
    let options = CommandOptions::args(["-c", "printf hidden"])
        .combine(CommandOptions::stdout(StdioMode::Null));
    let output = Command::new("sh", options).output().await.unwrap();
    assert!(output.stdout.is_empty());
    assert!(output.status.success);
}

#[test]
fn output_sync_runs_on_the_calling_thread() {
    let output = sh("printf sync; exit 3").output_sync().unwrap();
    assert_eq!(output.stdout, b"sync");
    assert_eq!(output.status.code, 3);
}

// ---- options ----

#[test]
fn combine_prefers_right_and_merges_env() {
    let left = CommandOptions::args(["a"])
        .combine(CommandOptions::env("ONE", "1"))
        .combine(CommandOptions::env("TWO", "2"));
    let right = CommandOptions::args(["b"]).combine(CommandOptions::env("TWO", "two"));
    let merged = left.combine(right);
    assert_eq!(merged.args, Some(vec!["b".to_string()]));
    let env = merged.env.unwrap();
    assert_eq!(env.get("ONE").map(String::as_str), Some("1"));
    assert_eq!(env.get("TWO").map(String::as_str), Some("two"));
}

#[test]
fn options_deserialize_from_camel_case() {
    let options: CommandOptions =
        serde_json::from_str(r#"{"args":["-c","true"],"clearEnv":true,"stdout":"null"}"#).unwrap();
    assert_eq!(options.clear_env, Some(true));
    assert_eq!(options.stdout, Some(StdioMode::Null));
}

// ---- signals ----

#[test]
fn signal_names_parse_with_or_without_prefix() {
    assert_eq!("SIGTERM".parse::<Signal>().unwrap(), Signal::Sigterm);
    assert_eq!("term".parse::<Signal>().unwrap(), Signal::Sigterm);
    assert_eq!(" sigint ".parse::<Signal>().unwrap(), Signal::Sigint);
    assert!("SIGBOGUS".parse::<Signal>().is_err());
    let err = Signal::parse("kill", "nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn signal_numbers_match_the_platform() {
    assert_eq!(Signal::Sigkill.number(), 9);
    assert_eq!(Signal::Sigterm.number(), 15);
    assert_eq!(Signal::from_number(2), Some(Signal::Sigint));
}

proptest! {
    #[test]
    fn every_signal_round_trips_through_its_name(index in 0usize..Signal::ALL.len()) {
        let signal = Signal::ALL[index];
        prop_assert_eq!(signal.name().parse::<Signal>().unwrap(), signal);
        prop_assert_eq!(Signal::from_number(signal.number()), Some(signal));
    }
}
