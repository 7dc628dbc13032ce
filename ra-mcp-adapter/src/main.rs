//! `ra-mcp-adapter` entry point.
//!
//! Parses arguments, initialises tracing, and runs the bridge around the
//! given server command. The process exits with the server's exit code.

use clap::Parser;

use ra_mcp_adapter::bridge::run_bridge;
use ra_mcp_adapter::cli::CliArgs;
use ra_mcp_adapter::config::{BridgeConfig, USAGE};
use ra_mcp_adapter::error::BridgeError;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let code = match BridgeConfig::try_from(args) {
        Ok(config) => match run_bridge(config).await {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "bridge failed");
                eprintln!("ra-mcp-adapter: {e}");
                e.exit_code()
            }
        },
        Err(e @ BridgeError::NoCommand) => {
            eprintln!("{USAGE}");
            e.exit_code()
        }
        Err(e) => {
            eprintln!("ra-mcp-adapter: {e}");
            e.exit_code()
        }
    };

    // Exit without dropping the runtime: the stdin reader may still be
    // parked in a blocking read.
    std::process::exit(code);
}

/// Initialise the tracing subscriber on stderr.
///
/// `verbose` forces `debug`; otherwise `RUST_LOG` applies (default: errors
/// only), so the child's stderr relay stays clean.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
