//! RESP Protocol Implementation
//!
//! This module implements the streaming side of the Redis Serialization
//! Protocol: turning a fragmented byte stream into discrete commands.
//!
//! ## Modules
//!
//! - `types`: `RespValue` reply encoding and sigil constants
//! - `error`: `CommandError`, the failure type of the whole parsing engine
//! - `buffer`: `StreamBuffer`, the per-connection receive arena
//! - `scanner`: parses one `<sigil><digits>\r\n` header
//! - `filler`: re-reads from the socket until a header or payload is complete
//! - `assembler`: builds one `Command` out of an array of bulk strings
//!
//! ## Example
//!
//! ```
//! use respd::protocol::{CommandAssembler, StreamBuffer};
//!
//! # tokio_test::block_on(async {
//! let mut socket: &[u8] = b"*1\r\n$4\r\nPING\r\n";
//! let mut buffer = StreamBuffer::new(128);
//!
//! let command = CommandAssembler::default()
//!     .read_command(&mut socket, &mut buffer)
//!     .await
//!     .unwrap();
//! assert_eq!(command.name(), b"PING");
//! # });
//! ```

pub mod assembler;
pub mod buffer;
pub mod error;
pub mod filler;
pub mod scanner;
pub mod types;

// Re-export commonly used types for convenience
pub use assembler::{Command, CommandAssembler};
pub use buffer::StreamBuffer;
pub use error::CommandError;
pub use filler::Filler;
pub use scanner::{scan_header, Header};
pub use types::RespValue;
