//! End-to-end tests against the built `ra-mcp-adapter` binary.
#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn adapter(args: &[&str], stdin: &[u8], envs: &[(&str, &std::path::Path)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ra-mcp-adapter"));
    cmd.args(args)
        .env_remove("RA_MCP_ADAPTER_LOG")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().expect("failed to spawn adapter");
    {
        let mut child_stdin = child.stdin.take().unwrap();
        // The adapter may already be gone (usage error).
        let _ = child_stdin.write_all(stdin);
    }
    child.wait_with_output().expect("failed to wait on adapter")
}

#[test]
fn test_no_command_prints_usage_and_exits_2() {
    let out = adapter(&[], b"", &[]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage: ra-mcp-adapter <command> [args...]"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn test_round_trip_through_cat() {
    let input = b"{\n  \"jsonrpc\": \"2.0\",\n  \"id\": 1,\n  \"method\": \"ping\"\n}\n";
    // Pretty-printed JSON only works with Content-Length framing; NDJSON lines
    // are one message each, so send it framed.
    let framed = [
        format!("Content-Length: {}\r\n\r\n", input.len()).into_bytes(),
        input.to_vec(),
        b"{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n".to_vec(),
        b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n".to_vec(),
    ]
    .concat();

    let out = adapter(&["cat"], &framed, &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\
{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"tools/list\"}\n"
    );
}

#[test]
fn test_exit_code_matches_child() {
    let out = adapter(&["sh", "-c", "exit 7"], b"", &[]);
    assert_eq!(out.status.code(), Some(7));
}

#[test]
fn test_spawn_failure_exits_1() {
    let out = adapter(&["nonexistent-command-that-does-not-exist-12345"], b"", &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to start"));
}

#[test]
fn test_log_file_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("adapter.log");

    let out = adapter(
        &["cat"],
        b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
        &[("RA_MCP_ADAPTER_LOG", log.as_path())],
    );
    assert_eq!(out.status.code(), Some(0));

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains(" C->A {\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}"));
    assert!(contents.contains(" A->C {\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}"));
}
