//! Client → child pump: frame, normalize, filter, forward as NDJSON.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::filter::{Verdict, inbound_verdict};
use crate::framing::{Frame, read_frame};
use crate::normalize::{Parsed, compact, parse_payload, sanitize};
use crate::traffic_log::{LogTag, TrafficLog};

use super::helpers::{PumpEnd, PumpSummary, log_write_error, write_line};

/// Read client frames and write one compact line per message to the child.
///
/// Runs until the client stream ends or the child's stdin fails. The child's
/// stdin is shut down and dropped on return so the child sees EOF.
pub async fn client_to_child<R, W>(mut client_in: R, mut child_in: W, log: Arc<TrafficLog>) -> PumpSummary
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = PumpSummary::default();

    loop {
        let frame = match read_frame(&mut client_in).await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "client→child: read failed");
                summary.end = PumpEnd::ReadFailed;
                break;
            }
        };

        let payload = match frame {
            Frame::Eof => {
                tracing::debug!("client→child: client stream EOF");
                break;
            }
            Frame::Skip => continue,
            Frame::Malformed(anomaly) => {
                tracing::warn!(%anomaly, "client→child: skipping unusable header block");
                log.append(LogTag::ClientToAdapter, &anomaly.to_string()).await;
                summary.skipped += 1;
                continue;
            }
            Frame::Message(payload) if payload.is_empty() => continue,
            Frame::Message(payload) => payload,
        };

        let line = match parse_payload(&payload) {
            Parsed::Json(message) => match inbound_verdict(&message) {
                Verdict::Drop(reason) => {
                    tracing::info!(%reason, "client→child: message dropped");
                    log.append(LogTag::ClientToAdapter, &reason.to_string()).await;
                    summary.dropped += 1;
                    continue;
                }
                Verdict::Forward => compact(&message),
            },
            Parsed::Opaque(raw) => sanitize(&raw),
        };

        log.append(LogTag::ClientToAdapter, &String::from_utf8_lossy(&line))
            .await;

        if let Err(e) = write_line(&mut child_in, &line).await {
            log_write_error("client_to_child", &e);
            summary.end = PumpEnd::WriteFailed;
            break;
        }
        summary.forwarded += 1;
    }

    // Close the child's stdin; it may already be gone.
    if let Err(e) = child_in.shutdown().await {
        tracing::debug!(error = %e, "client→child: closing child stdin failed");
    }
    summary
}
