//! Shared pump types and I/O utilities.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Why a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    /// The source reached end of stream.
    Eof,
    /// Reading from the source failed.
    ReadFailed,
    /// Writing to the destination failed (usually a broken pipe).
    WriteFailed,
}

/// Counters reported by a pump when it stops.
///
/// For the stderr relay `forwarded` counts chunks rather than messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpSummary {
    pub forwarded: u64,
    pub dropped: u64,
    pub skipped: u64,
    pub end: PumpEnd,
}

impl Default for PumpSummary {
    fn default() -> Self {
        Self {
            forwarded: 0,
            dropped: 0,
            skipped: 0,
            end: PumpEnd::Eof,
        }
    }
}

/// Write `payload` plus a `\n` terminator in one call, then flush.
pub(super) async fn write_line<W>(writer: &mut W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::with_capacity(payload.len() + 1);
    line.extend_from_slice(payload);
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await
}

/// Log a destination write failure at a level matching its expectedness.
///
/// Broken pipes are the normal way a peer goes away at shutdown.
pub(super) fn log_write_error(pump: &'static str, e: &std::io::Error) {
    if e.kind() == std::io::ErrorKind::BrokenPipe {
        tracing::debug!(pump, "destination closed (broken pipe)");
    } else {
        tracing::warn!(pump, error = %e, "write failed, stopping pump");
    }
}
