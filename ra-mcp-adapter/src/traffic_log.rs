//! Optional append-only traffic log.
//!
//! Enabled by `--log-file` / `RA_MCP_ADAPTER_LOG`. Every event becomes one
//! line of the form `<utc timestamp> <tag> <text>`, appended with a single
//! write so lines from concurrent pumps never interleave. Write failures are
//! ignored: the log must never affect the data path.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Source tag written after the timestamp of each log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    /// Traffic read from the client (and forwarded to the child).
    ClientToAdapter,
    /// Traffic read from the child (and forwarded to the client).
    AdapterToClient,
    /// A chunk of the child's stderr.
    ChildStderr,
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientToAdapter => f.write_str("C->A"),
            Self::AdapterToClient => f.write_str("A->C"),
            Self::ChildStderr => f.write_str("A[stderr]"),
        }
    }
}

/// Shared traffic log sink. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct TrafficLog {
    path: Option<PathBuf>,
    // Serializes appends; the file is reopened per event.
    lock: Mutex<()>,
}

impl TrafficLog {
    /// Log to `path`, or nowhere when `None`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// The log file path, if enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one event. Never fails.
    pub async fn append(&self, tag: LogTag, text: &str) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let line = format_line(Utc::now(), tag, text);

        let _guard = self.lock.lock().await;
        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = result {
            tracing::trace!(path = %path.display(), error = %e, "traffic log write failed");
        }
    }
}

/// Render one log line, including the trailing newline.
pub fn format_line(at: DateTime<Utc>, tag: LogTag, text: &str) -> String {
    format!(
        "{} {tag} {text}\n",
        at.to_rfc3339_opts(SecondsFormat::Micros, false)
    )
}
