//! Process supervisor: spawns the server and runs the three pumps.
//!
//! ```text
//! client stdin  ──frame/normalize/filter──▶ child stdin
//! client stdout ◀──────line/filter────────  child stdout
//! own stderr    ◀────────bytes──────────── child stderr  (+ traffic log)
//! ```
//!
//! Each pump is its own tokio task touching exactly one source and one
//! destination. Nothing is correlated across directions, so no pump ever
//! waits on another. Shutdown starts when the child→client pump ends.

mod child_to_client;
mod client_to_child;
mod helpers;
mod shutdown;
mod stderr_relay;

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::process::Command;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::traffic_log::TrafficLog;

pub use child_to_client::child_to_client;
pub use client_to_child::client_to_child;
pub use helpers::{PumpEnd, PumpSummary};
pub use stderr_relay::{STDERR_CHUNK_BYTES, stderr_relay};

use shutdown::{await_clean_exit, exit_code, join_pump, request_termination, wait_for_exit};

/// Run the bridge on this process's stdin, stdout and stderr.
///
/// Returns the child's exit code.
///
/// # Errors
///
/// Returns [`BridgeError`] if the child cannot be spawned, its pipes
/// cannot be captured, or waiting on it fails.
pub async fn run_bridge(config: BridgeConfig) -> Result<i32, BridgeError> {
    let log = Arc::new(TrafficLog::new(config.log_file.clone()));
    run_bridge_with(
        &config,
        log,
        tokio::io::stdin(),
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await
}

/// Run the bridge against arbitrary client-side streams.
///
/// `client_in`/`client_out` face the client; `own_err` receives the child's
/// stderr.
pub async fn run_bridge_with<I, O, E>(
    config: &BridgeConfig,
    log: Arc<TrafficLog>,
    client_in: I,
    client_out: O,
    own_err: E,
) -> Result<i32, BridgeError>
where
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin + Send + 'static,
    E: AsyncWrite + Unpin + Send + 'static,
{
    let mut child = Command::new(&config.command)
        .args(&config.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BridgeError::Spawn {
            command: config.command.clone(),
            source,
        })?;

    tracing::info!(
        command = %config.command,
        pid = child.id(),
        log_file = ?log.path(),
        "server process spawned"
    );

    let child_stdin = child
        .stdin
        .take()
        .ok_or(BridgeError::PipeUnavailable { stream: "stdin" })?;
    let child_stdout = child
        .stdout
        .take()
        .ok_or(BridgeError::PipeUnavailable { stream: "stdout" })?;
    let child_stderr = child
        .stderr
        .take()
        .ok_or(BridgeError::PipeUnavailable { stream: "stderr" })?;

    let stderr_handle = tokio::spawn(stderr_relay(child_stderr, own_err, log.clone()));
    let inbound_handle = tokio::spawn(client_to_child(
        BufReader::new(client_in),
        child_stdin,
        log.clone(),
    ));
    let outbound_handle = tokio::spawn(child_to_client(
        BufReader::new(child_stdout),
        client_out,
        log,
    ));

    match outbound_handle.await {
        Ok(summary) => tracing::info!(
            forwarded = summary.forwarded,
            dropped = summary.dropped,
            end = ?summary.end,
            "child→client stream closed"
        ),
        Err(e) => tracing::error!(error = %e, "child→client task panicked"),
    }

    let exited = await_clean_exit(&mut child, config.shutdown.close_grace).await?;
    if exited.is_none() {
        request_termination(&mut child);
    }

    let grace = config.shutdown.join_grace;
    if let Some(summary) = join_pump("client_to_child", inbound_handle, grace).await {
        tracing::info!(
            forwarded = summary.forwarded,
            dropped = summary.dropped,
            skipped = summary.skipped,
            "client→child stream closed"
        );
    }
    join_pump("stderr_relay", stderr_handle, grace).await;

    Ok(match exited {
        Some(status) => exit_code(status),
        None => wait_for_exit(&mut child, &config.shutdown).await,
    })
}
