//! Command Assembler
//!
//! Reads exactly one command (an array of bulk strings) from the stream
//! buffer, pulling more bytes from the socket whenever a header or payload
//! is still in flight.
//!
//! ```text
//! *2\r\n  $4\r\n PING\r\n  $2\r\n hi\r\n
//! └─┬──┘  └─┬──┘ └──┬───┘  └─┬──┘ └─┬─┘
//!  count   len   payload    len  payload
//! ```
//!
//! A command only leaves the assembler once every argument's header and
//! payload have been received. Any failure discards the partial command.

use super::buffer::StreamBuffer;
use super::error::CommandError;
use super::filler::Filler;
use super::types::{RespValue, CRLF};
use crate::config::ServerConfig;
use bytes::Bytes;
use tokio::io::AsyncRead;
use tracing::trace;

/// One fully received command: its arguments in arrival order, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Creates a command from its arguments.
    pub fn new(args: Vec<Bytes>) -> Self {
        Self { args }
    }

    /// Builds a command from string-like arguments.
    ///
    /// ```
    /// use respd::protocol::Command;
    /// let cmd = Command::from_args(["PING"]);
    /// assert_eq!(cmd.encode(), b"*1\r\n$4\r\nPING\r\n");
    /// ```
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self::new(args.into_iter().map(Into::into).collect())
    }

    /// The first argument, as received.
    pub fn name(&self) -> &[u8] {
        self.args.first().map(|b| &b[..]).unwrap_or_default()
    }

    /// All arguments, including the name.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Encodes the command the way a client sends it: an array of bulk strings.
    pub fn encode(&self) -> Vec<u8> {
        RespValue::array(
            self.args
                .iter()
                .cloned()
                .map(RespValue::BulkString)
                .collect(),
        )
        .serialize()
    }
}

/// Reads commands off a stream buffer under fixed size limits.
#[derive(Debug, Clone, Copy)]
pub struct CommandAssembler {
    filler: Filler,
    max_arguments: usize,
    max_argument_size: usize,
}

impl CommandAssembler {
    pub fn new(max_arguments: usize, max_argument_size: usize, max_read_iterations: usize) -> Self {
        Self {
            filler: Filler::new(max_read_iterations),
            max_arguments,
            max_argument_size,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.max_arguments,
            config.max_argument_size,
            config.max_read_iterations,
        )
    }

    /// Reads one complete command starting at the buffer's cursor.
    ///
    /// On success the cursor sits on the first byte after the command, which
    /// may already belong to the next pipelined command.
    pub async fn read_command<R>(
        &self,
        reader: &mut R,
        buffer: &mut StreamBuffer,
    ) -> Result<Command, CommandError>
    where
        R: AsyncRead + Unpin,
    {
        let count = self.filler.read_header(reader, buffer).await?.value;
        if count == 0 {
            return Err(CommandError::EmptyArray);
        }
        if count > self.max_arguments {
            return Err(CommandError::TooManyArguments {
                count,
                max: self.max_arguments,
            });
        }

        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            let size = self.filler.read_header(reader, buffer).await?.value;
            if size == 0 {
                return Err(CommandError::EmptyArgument);
            }
            if size > self.max_argument_size {
                return Err(CommandError::ArgumentTooLarge {
                    size,
                    max: self.max_argument_size,
                });
            }

            let needed = size
                .checked_add(CRLF.len())
                .ok_or(CommandError::LengthOverflow)?;
            self.filler.require(reader, buffer, needed).await?;
            args.push(buffer.take_payload(size)?);
        }

        trace!(
            arguments = args.len(),
            cursor = buffer.cursor(),
            size = buffer.len(),
            "Assembled command"
        );
        Ok(Command::new(args))
    }
}

impl Default for CommandAssembler {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}
