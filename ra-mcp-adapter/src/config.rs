//! Runtime configuration for a bridge session.
//!
//! Built from [`CliArgs`](crate::cli::CliArgs). Kept separate so tests can
//! construct a config without going through argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::CliArgs;
use crate::error::BridgeError;

/// Environment variable naming the traffic log file.
pub const LOG_ENV_VAR: &str = "RA_MCP_ADAPTER_LOG";

/// Exit code for a missing server command.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit code when the child had to be killed or reported no exit code.
pub const FORCED_EXIT_CODE: i32 = 1;

/// Usage line printed to stderr when no command is given.
pub const USAGE: &str = "Usage: ra-mcp-adapter <command> [args...]";

/// Bounded waits for the shutdown sequence.
///
/// 1. Wait `close_grace` for the child to exit on its own
/// 2. Request termination of the child
/// 3. Wait `join_grace` for each remaining pump
/// 4. Wait `exit_grace` for the child to exit
/// 5. Kill and reap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownRequest {
    /// Wait after the child's stdout closes before requesting termination.
    pub close_grace: Duration,
    /// Per-pump wait after the outbound pump ends.
    pub join_grace: Duration,
    /// Time to wait for the child to exit before killing it.
    pub exit_grace: Duration,
}

impl Default for ShutdownRequest {
    fn default() -> Self {
        Self {
            close_grace: Duration::from_millis(500),
            join_grace: Duration::from_secs(1),
            exit_grace: Duration::from_secs(2),
        }
    }
}

/// Everything the supervisor needs to run one session.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Server executable.
    pub command: String,
    /// Server arguments.
    pub args: Vec<String>,
    /// Traffic log path, if logging is enabled.
    pub log_file: Option<PathBuf>,
    /// Shutdown bounds.
    pub shutdown: ShutdownRequest,
}

impl BridgeConfig {
    /// Config for `command args...` with logging disabled and default timings.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            log_file: None,
            shutdown: ShutdownRequest::default(),
        }
    }
}

impl TryFrom<CliArgs> for BridgeConfig {
    type Error = BridgeError;

    fn try_from(cli: CliArgs) -> Result<Self, Self::Error> {
        let mut command = cli.command.into_iter();
        let program = command.next().ok_or(BridgeError::NoCommand)?;

        Ok(Self {
            command: program,
            args: command.collect(),
            // An empty value disables logging, matching an unset variable.
            log_file: cli.log_file.filter(|p| !p.as_os_str().is_empty()),
            shutdown: ShutdownRequest {
                close_grace: Duration::from_millis(cli.close_grace_ms),
                join_grace: Duration::from_millis(cli.join_grace_ms),
                exit_grace: Duration::from_millis(cli.exit_grace_ms),
            },
        })
    }
}
