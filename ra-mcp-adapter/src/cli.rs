//! Command-line arguments for `ra-mcp-adapter`.
//!
//! Defined outside `main.rs` so integration tests can parse them directly.

use std::path::PathBuf;

use clap::Parser;

use crate::config::LOG_ENV_VAR;

/// Stdio compatibility bridge between strict MCP clients and line-delimited
/// MCP servers.
///
/// Everything after the adapter's own options (optionally separated by `--`)
/// is the server command and its arguments.
#[derive(Parser, Debug)]
#[command(name = "ra-mcp-adapter", version)]
pub struct CliArgs {
    /// Append every forwarded or dropped message to this file.
    #[arg(long, env = LOG_ENV_VAR)]
    pub log_file: Option<PathBuf>,

    /// How long to let the child exit on its own after its stdout closes (ms).
    #[arg(long, default_value_t = 500)]
    pub close_grace_ms: u64,

    /// How long to wait for each pump to finish after the child's stdout closes (ms).
    #[arg(long, default_value_t = 1000)]
    pub join_grace_ms: u64,

    /// How long to wait for the child to exit before killing it (ms).
    #[arg(long, default_value_t = 2000)]
    pub exit_grace_ms: u64,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Server command and arguments.
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}
