//! Stdio compatibility bridge for line-delimited MCP servers.
//!
//! Sits between a strict MCP client and a child server process that speaks a
//! looser dialect of the protocol. Client frames (NDJSON or `Content-Length`)
//! are normalized to compact NDJSON for the child, and two known-bad message
//! shapes are dropped on their way through.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod framing;
pub mod normalize;
pub mod traffic_log;

