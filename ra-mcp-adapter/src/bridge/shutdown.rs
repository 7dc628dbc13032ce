//! Shutdown sequence for the child process.
//!
//! 1. Wait `close_grace` for the child to exit on its own
//! 2. Request termination (SIGTERM on Unix) if it is still running
//! 3. Wait `join_grace` for each remaining pump
//! 4. Wait `exit_grace` for the child to exit
//! 5. Kill, reap, and report the generic forced-exit code

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::task::JoinHandle;

use crate::config::{FORCED_EXIT_CODE, ShutdownRequest};
use crate::error::BridgeError;

use super::helpers::PumpSummary;

/// Give a child whose stdout just closed a chance to finish exiting.
///
/// Returns `None` if it is still running after `grace`.
pub(super) async fn await_clean_exit(
    child: &mut Child,
    grace: Duration,
) -> Result<Option<ExitStatus>, BridgeError> {
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let status = status?;
            tracing::debug!(?status, "server process exited on its own");
            Ok(Some(status))
        }
        Err(_) => {
            tracing::debug!(
                grace_ms = grace.as_millis() as u64,
                "server still running after stdout closed"
            );
            Ok(None)
        }
    }
}

/// Exit code reported for a finished child; signal deaths map to the generic code.
pub(super) fn exit_code(status: ExitStatus) -> i32 {
    let code = status.code().unwrap_or(FORCED_EXIT_CODE);
    tracing::info!(code, ?status, "server process exited");
    code
}

/// Ask the child to terminate without waiting for it.
pub(super) fn request_termination(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;
        if let Some(pid) = child.id() {
            tracing::debug!(pid, "sending SIGTERM to server process");
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                // ESRCH: already exited.
                tracing::debug!(pid, error = ?e, "SIGTERM failed");
            }
        }
    }

    #[cfg(not(unix))]
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "terminate request failed");
    }
}

/// Wait up to `grace` for a pump task; a pump still blocked on its source is
/// left running and abandoned at process exit.
pub(super) async fn join_pump(
    pump: &'static str,
    handle: JoinHandle<PumpSummary>,
    grace: std::time::Duration,
) -> Option<PumpSummary> {
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(summary)) => {
            tracing::debug!(pump, ?summary, "pump finished");
            Some(summary)
        }
        Ok(Err(e)) => {
            tracing::error!(pump, error = %e, "pump task panicked");
            None
        }
        Err(_) => {
            tracing::debug!(pump, "pump still blocked after grace period");
            None
        }
    }
}

/// Collect the child's exit code, escalating to a kill after `exit_grace`.
pub(super) async fn wait_for_exit(child: &mut Child, req: &ShutdownRequest) -> i32 {
    match tokio::time::timeout(req.exit_grace, child.wait()).await {
        Ok(Ok(status)) => return exit_code(status),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "waiting on server process failed");
        }
        Err(_) => {
            tracing::warn!(
                grace_ms = req.exit_grace.as_millis() as u64,
                "server did not exit in time, killing"
            );
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::error!(error = %e, "kill failed");
    }
    // Reap so no zombie outlives us; the code is the generic one regardless.
    match tokio::time::timeout(req.exit_grace, child.wait()).await {
        Ok(Ok(status)) => tracing::info!(?status, "server process killed"),
        Ok(Err(e)) => tracing::error!(error = %e, "waiting on killed server process failed"),
        Err(_) => tracing::error!("server process did not exit after kill"),
    }
    FORCED_EXIT_CODE
}
