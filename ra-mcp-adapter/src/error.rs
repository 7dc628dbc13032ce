//! Error types for the frame reader and the process supervisor.
//!
//! `FramingError` only covers I/O failures on the client stream. Framing
//! anomalies are reported as
//! [`Frame::Malformed`](crate::framing::Frame::Malformed) and blank lines as
//! [`Frame::Skip`](crate::framing::Frame::Skip), so a single bad frame never
//! ends the session.
//!
//! `BridgeError` covers startup and supervision failures.

/// Errors raised while reading a frame from the client stream.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// An underlying IO error occurred while reading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the process supervisor.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// No child command was supplied on the command line.
    #[error("no server command specified")]
    NoCommand,

    /// The child process failed to start.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// The command that could not be spawned.
        command: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// A piped child stream was not available after spawning.
    #[error("failed to capture child {stream}")]
    PipeUnavailable {
        /// `"stdin"`, `"stdout"` or `"stderr"`.
        stream: &'static str,
    },

    /// Waiting on the child process failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Process exit code used when this error ends the bridge.
    ///
    /// A missing command is a usage error (`2`); everything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCommand => crate::config::USAGE_EXIT_CODE,
            _ => crate::config::FORCED_EXIT_CODE,
        }
    }
}
