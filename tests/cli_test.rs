//! Tests for the patchstream binary.

mod common;

use common::{sse_body, sse_server, stream_url};
use std::process::Command;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_patchstream"));
    cmd.env_remove("PATCHSTREAM_URL")
        .env_remove("PATCHSTREAM_API_URL")
        .env_remove("PATCHSTREAM_TOKEN")
        .env_remove("PATCHSTREAM_PROXY_BASE")
        .env_remove("PATCHSTREAM_CLOSE_TIMEOUT_SECS");
    cmd
}

#[test]
fn test_version_flag() {
    let output = binary().arg("--version").output().expect("Failed to execute binary");

    assert!(output.status.success(), "Version flag should exit with code 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("patchstream {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_unknown_flag_prints_usage() {
    let output = binary().arg("--bogus").output().expect("Failed to execute binary");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown argument: --bogus"));
    assert!(stderr.contains("Usage: patchstream"));
}

#[test]
fn test_missing_target_fails() {
    let output = binary().output().expect("Failed to execute binary");
    assert!(!output.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_streams_until_server_ends() {
    let server = sse_server(&sse_body(&[
        ("data", r#"{"a":1}"#),
        ("patch", r#"[{"op":"add","path":"/b","value":2}]"#),
    ]))
    .await;

    let url = stream_url(&server);
    let output = binary()
        .args(["--url", url.as_str(), "--duration", "10"])
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("events: 2"), "stdout: {stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fatal_session_exits_non_zero() {
    let server = sse_server(&sse_body(&[("patch", "[]"), ("error", "nope")])).await;

    let url = stream_url(&server);
    let output = binary()
        .args(["--url", url.as_str(), "--duration", "10"])
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
}
