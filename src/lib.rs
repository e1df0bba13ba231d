//! # respd - A Minimal RESP Server
//!
//! respd speaks a subset of the RESP (REdis Serialization Protocol) wire
//! format over TCP. Its interesting part is the streaming command assembler:
//! bytes that arrive fragmented across many socket reads are reassembled into
//! discrete commands (arrays of bulk strings), and several pipelined
//! commands can share one connection and one buffer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               respd                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └──────┬──────┘    └─────────────┘                  │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      CommandAssembler                            │  │
//! │  │  ┌──────────┐   ┌──────────┐   ┌──────────────────────────────┐  │  │
//! │  │  │  Filler  │──>│ Scanner  │   │ StreamBuffer                 │  │  │
//! │  │  │ (bounded │   │ *N / $N  │   │ [consumed|unparsed|spare]    │  │  │
//! │  │  │  reads)  │   └──────────┘   └──────────────────────────────┘  │  │
//! │  │  └──────────┘                                                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use respd::{server, CommandHandler, ConnectionStats, ServerConfig};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(config.bind_address()).await?;
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     server::run(listener, &config, CommandHandler::new(), stats).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `PING` (any arguments are ignored)
//! - `QUIT`
//!
//! Every other command gets `-1` back and the connection stays open.
//!
//! ## Module Overview
//!
//! - [`protocol`]: stream buffer, header scanner, filler and command assembler
//! - [`connection`]: per-connection pipeline driver
//! - [`commands`]: command dispatch
//! - [`config`]: bind address and protocol limits
//! - [`server`]: TCP accept loop
//!
//! ## Failure Model
//!
//! A malformed, oversized or truncated command is fatal to its connection:
//! the socket is closed without a reply. Other connections are unaffected.

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, Response};
pub use config::{ConfigError, ServerConfig};
pub use connection::{handle_connection, ConnectionError, ConnectionStats};
pub use protocol::{Command, CommandAssembler, CommandError, RespValue, StreamBuffer};

/// The default port respd listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host respd binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of respd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
