//! Child → client pump: line-read child stdout, filter, forward as NDJSON.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};

use crate::filter::{Verdict, outbound_verdict};
use crate::traffic_log::{LogTag, TrafficLog};

use super::helpers::{PumpEnd, PumpSummary, log_write_error, write_line};

/// Forward child stdout lines to the client.
///
/// Lines are trimmed and forwarded verbatim; parsing is only used to apply
/// the outbound drop rule, so unparseable lines pass through untouched.
/// Ends on child stdout EOF or when the client's stdout fails; either one
/// starts the shutdown sequence.
pub async fn child_to_client<R, W>(mut child_out: R, mut client_out: W, log: Arc<TrafficLog>) -> PumpSummary
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = PumpSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match child_out.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::debug!("child→client: child stdout EOF");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "child→client: read failed");
                summary.end = PumpEnd::ReadFailed;
                break;
            }
        }

        let payload = buf.trim_ascii();
        if payload.is_empty() {
            summary.skipped += 1;
            continue;
        }

        if let Ok(message) = serde_json::from_slice::<Value>(payload) {
            if let Verdict::Drop(reason) = outbound_verdict(&message) {
                tracing::info!(%reason, "child→client: message dropped");
                log.append(LogTag::AdapterToClient, &reason.to_string()).await;
                summary.dropped += 1;
                continue;
            }
        }

        log.append(LogTag::AdapterToClient, &String::from_utf8_lossy(payload))
            .await;

        if let Err(e) = write_line(&mut client_out, payload).await {
            log_write_error("child_to_client", &e);
            summary.end = PumpEnd::WriteFailed;
            break;
        }
        summary.forwarded += 1;
    }

    summary
}
