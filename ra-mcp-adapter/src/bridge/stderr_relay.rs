//! Child stderr relay: byte-for-byte copy to our own stderr, mirrored into
//! the traffic log.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::traffic_log::{LogTag, TrafficLog};

use super::helpers::{PumpEnd, PumpSummary, log_write_error};

/// Read size for stderr chunks.
pub const STDERR_CHUNK_BYTES: usize = 8192;

/// Copy the child's stderr to `own_err` until EOF or a write failure.
pub async fn stderr_relay<R, W>(mut child_err: R, mut own_err: W, log: Arc<TrafficLog>) -> PumpSummary
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = PumpSummary::default();
    let mut chunk = vec![0u8; STDERR_CHUNK_BYTES];

    loop {
        let n = match child_err.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "stderr relay: read failed");
                summary.end = PumpEnd::ReadFailed;
                break;
            }
        };
        let bytes = &chunk[..n];

        let written = async {
            own_err.write_all(bytes).await?;
            own_err.flush().await
        }
        .await;
        if let Err(e) = written {
            log_write_error("stderr_relay", &e);
            summary.end = PumpEnd::WriteFailed;
            break;
        }

        log.append(LogTag::ChildStderr, String::from_utf8_lossy(bytes).trim_end())
            .await;
        summary.forwarded += 1;
    }

    summary
}
