//! Connection Handler Module
//!
//! This module drives a single client connection. Each client gets its own
//! handler task that loops: fill, assemble, dispatch, reply, then decide what
//! to do with the buffer.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned, StreamBuffer allocated
//!        │
//!        ▼
//! 3. ┌──────────────────────────────────┐
//!    │      Main Loop                   │
//!    │                                  │
//!    │  ┌─────────────────────────────┐ │
//!    │  │ NeedsFill: reset + read     │ │
//!    │  └──────────────┬──────────────┘ │
//!    │                 ▼                │
//!    │  ┌─────────────────────────────┐ │
//!    │  │ Assemble one command        │ │◄──┐
//!    │  └──────────────┬──────────────┘ │   │
//!    │                 ▼                │   │
//!    │  ┌─────────────────────────────┐ │   │
//!    │  │ Dispatch + send reply       │ │   │
//!    │  └──────────────┬──────────────┘ │   │
//!    │                 ▼                │   │
//!    │   cursor == size ? NeedsFill     │   │
//!    │                  : compact ──────┼───┘ (HasResidue)
//!    └──────────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF / error / closing reply: handler task ends, socket dropped
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol: one read may carry half a command, or the tail
//! of one command plus the start of the next. The handler never rereads
//! bytes it already has. When a command leaves bytes behind, they are moved
//! to the front of the buffer and parsing resumes without touching the
//! socket.

use crate::commands::{CommandHandler, Response};
use crate::protocol::{CommandAssembler, CommandError, StreamBuffer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Connections closed because of a protocol violation
    pub protocol_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: u64) {
        self.bytes_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Where the next command's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferState {
    /// Buffer is exhausted; reset it and read from the socket first
    NeedsFill,
    /// Buffer starts with unparsed bytes of the next pipelined command
    HasResidue,
}

/// Handles a single client connection.
///
/// Generic over the stream so the pipeline can be driven by anything that
/// reads and writes bytes, a `TcpStream` in production.
pub struct ConnectionHandler<S> {
    /// The stream for this connection
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: StreamBuffer,

    /// Bytes of `buffer.total_received()` already counted in `stats`
    counted: u64,

    /// Turns buffered bytes into commands
    assembler: CommandAssembler,

    /// The command handler (shared across connections)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The stream for this connection
    /// * `addr` - The client's socket address
    /// * `buffer_size` - Initial stream buffer capacity
    /// * `assembler` - Command assembler carrying the protocol limits
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        buffer_size: usize,
        assembler: CommandAssembler,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: StreamBuffer::new(buffer_size),
            counted: 0,
            assembler,
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Reads commands from the client, executes them and sends back
    /// responses until the client disconnects, misbehaves, or a command asks
    /// for the connection to be closed. The stream is dropped on every exit
    /// path.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;
        self.count_bytes_read();

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                | ConnectionError::Command(CommandError::Io(io_err))
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                ConnectionError::Command(cmd_err) if cmd_err.is_protocol_violation() => {
                    self.stats.protocol_error();
                    warn!(client = %self.addr, error = %e, "Protocol violation, closing connection")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The fill-assemble-dispatch-reply loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        let mut state = BufferState::NeedsFill;

        loop {
            if state == BufferState::NeedsFill {
                self.buffer.reset();
                match self.buffer.fill(self.stream.get_mut(), false).await {
                    Ok(n) => trace!(client = %self.addr, bytes = n, "Read data"),
                    Err(CommandError::Closed { .. }) => {
                        return Err(ConnectionError::ClientDisconnected)
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let command = self
                .assembler
                .read_command(self.stream.get_mut(), &mut self.buffer)
                .await?;
            self.count_bytes_read();
            trace!(
                client = %self.addr,
                arguments = command.len(),
                remaining = self.buffer.available(),
                "Parsed command"
            );

            let response = self.command_handler.execute(&command);
            self.stats.command_processed();
            self.send_response(&response).await?;

            if response.close {
                debug!(client = %self.addr, "Command requested connection close");
                return Ok(());
            }

            state = if self.buffer.is_exhausted() {
                BufferState::NeedsFill
            } else {
                self.buffer.compact();
                BufferState::HasResidue
            };
        }
    }

    /// Sends a response to the client.
    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let bytes = response.value.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            reply = %response.value,
            "Sent response"
        );
        Ok(())
    }

    fn count_bytes_read(&mut self) {
        let total = self.buffer.total_received();
        self.stats.bytes_read(total - self.counted);
        self.counted = total;
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error while writing a reply
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reading a command failed
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Client closed the stream between commands
    #[error("Client disconnected")]
    ClientDisconnected,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. `run` already logs how the connection ended.
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    buffer_size: usize,
    assembler: CommandAssembler,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler =
        ConnectionHandler::new(stream, addr, buffer_size, assembler, command_handler, stats);
    let _ = handler.run().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::{Builder, Mock};

    const PING: &[u8] = b"*1\r\n$4\r\nPING\r\n";
    const PONG: &[u8] = b"+PONG\r\n";

    fn client_addr() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn handler_for(
        mock: Mock,
        buffer_size: usize,
        assembler: CommandAssembler,
    ) -> (ConnectionHandler<Mock>, Arc<ConnectionStats>) {
        let stats = Arc::new(ConnectionStats::new());
        let handler = ConnectionHandler::new(
            mock,
            client_addr(),
            buffer_size,
            assembler,
            CommandHandler::new(),
            Arc::clone(&stats),
        );
        (handler, stats)
    }

    async fn run_with(mock: Mock) -> (Result<(), ConnectionError>, Arc<ConnectionStats>) {
        let (handler, stats) = handler_for(mock, 128, CommandAssembler::default());
        (handler.run().await, stats)
    }

    #[tokio::test]
    async fn test_ping_pong() {
        let mock = Builder::new().read(PING).write(PONG).build();
        let (result, stats) = run_with(mock).await;

        assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_unknown_command_keeps_connection() {
        let mock = Builder::new()
            .read(b"*1\r\n$4\r\nPONG\r\n")
            .write(b"-1\r\n")
            .read(PING)
            .write(PONG)
            .build();
        let (_, stats) = run_with(mock).await;

        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_pipelined_in_one_read() {
        let mut input = PING.to_vec();
        input.extend_from_slice(PING);

        let mock = Builder::new().read(&input).write(PONG).write(PONG).build();
        let (_, stats) = run_with(mock).await;

        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 2);
        assert_eq!(stats.bytes_read.load(Ordering::Relaxed), 28);
        assert_eq!(stats.bytes_written.load(Ordering::Relaxed), 14);
    }

    #[tokio::test]
    async fn test_pipelined_split_mid_second_command() {
        // The first read carries all of the first command plus half of the
        // second; the residue must be kept across the compaction.
        let mock = Builder::new()
            .read(b"*1\r\n$4\r\nPING\r\n*1\r\n$4\r")
            .write(PONG)
            .read(b"\nPING\r\n")
            .write(PONG)
            .build();
        let (_, stats) = run_with(mock).await;

        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_one_byte_per_read() {
        let mut builder = Builder::new();
        for byte in PING.chunks(1) {
            builder.read(byte);
        }
        let mock = builder.write(PONG).build();
        let (result, stats) = run_with(mock).await;

        assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_many_pipelined_in_small_buffer() {
        let commands: Vec<u8> = PING.repeat(10);
        let mut builder = Builder::new();
        builder.read(&commands);
        for _ in 0..10 {
            builder.write(PONG);
        }

        let (handler, stats) = handler_for(builder.build(), 8, CommandAssembler::default());
        let result = handler.run().await;

        assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 10);
    }

    #[tokio::test]
    async fn test_zero_length_array_closes_without_reply() {
        let mock = Builder::new().read(b"*0\r\n").build();
        let (result, stats) = run_with(mock).await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::EmptyArray))
        ));
        assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 1);
        assert_eq!(stats.bytes_written.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_zero_length_argument_closes_without_reply() {
        let mock = Builder::new().read(b"*1\r\n$0\r\n").build();
        let (result, _) = run_with(mock).await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::EmptyArgument))
        ));
    }

    #[tokio::test]
    async fn test_oversized_argument_closes_without_reply() {
        let mock = Builder::new().read(b"*1\r\n$999999999\r\n").build();
        let (result, _) = run_with(mock).await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::ArgumentTooLarge { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_limit_closes_connection() {
        // Initial fill plus two retries only ever sees "*1\r".
        let mock = Builder::new().read(b"*").read(b"1").read(b"\r").build();
        let (handler, stats) = handler_for(mock, 128, CommandAssembler::new(128, 128, 2));
        let result = handler.run().await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::ReadLimitExceeded { attempts: 2 }))
        ));
        assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_quit_closes_after_reply() {
        let mut input = b"*1\r\n$4\r\nQUIT\r\n".to_vec();
        // Delivered in the same read but never dispatched.
        input.extend_from_slice(PING);
        let mock = Builder::new().read(&input).write(b"+OK\r\n").build();

        let (result, stats) = run_with(mock).await;

        assert!(result.is_ok());
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_truncated_command_is_an_error() {
        let mock = Builder::new().read(b"*1\r\n$4\r\nPI").build();
        let (result, stats) = run_with(mock).await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::Closed { buffered: 2 }))
        ));
        assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_read_error_ends_connection() {
        let err = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        let mock = Builder::new().read_error(err).build();
        let (result, stats) = run_with(mock).await;

        assert!(matches!(
            result,
            Err(ConnectionError::Command(CommandError::Io(_)))
        ));
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_handle_connection_runs_to_completion() {
        let mock = Builder::new().read(PING).write(PONG).build();
        let stats = Arc::new(ConnectionStats::new());

        handle_connection(
            mock,
            client_addr(),
            128,
            CommandAssembler::default(),
            CommandHandler::new(),
            Arc::clone(&stats),
        )
        .await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.bytes_read.load(Ordering::Relaxed), PING.len() as u64);
    }

    mod pipelines {
        use super::*;
        use crate::protocol::Command;
        use bytes::Bytes;
        use proptest::prelude::*;

        fn ping_command() -> impl Strategy<Value = Command> {
            (
                prop::sample::select(vec!["PING", "ping", "PiNg"]),
                prop::collection::vec(prop::collection::vec(any::<u8>(), 1..=16), 0..4),
            )
                .prop_map(|(name, extra)| {
                    let mut args = vec![Bytes::from_static(name.as_bytes())];
                    args.extend(extra.into_iter().map(Bytes::from));
                    Command::new(args)
                })
        }

        /// Cuts `stream` into consecutive chunks, cycling through `sizes`.
        fn split(stream: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
            let mut chunks = Vec::new();
            let mut rest = stream;
            for &size in sizes.iter().cycle() {
                if rest.is_empty() {
                    break;
                }
                let (chunk, tail) = rest.split_at(size.min(rest.len()));
                chunks.push(chunk.to_vec());
                rest = tail;
            }
            chunks
        }

        proptest! {
            #[test]
            fn test_every_pipelined_command_gets_one_reply(
                commands in prop::collection::vec(ping_command(), 1..12),
                sizes in prop::collection::vec(1usize..=24, 1..16),
                buffer_size in 4usize..64,
            ) {
                let stream: Vec<u8> = commands.iter().flat_map(Command::encode).collect();

                let mut builder = Builder::new();
                for chunk in split(&stream, &sizes) {
                    builder.read(&chunk);
                }
                builder.write(&PONG.repeat(commands.len()));
                let (handler, stats) =
                    handler_for(builder.build(), buffer_size, CommandAssembler::default());

                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();
                let result = runtime.block_on(handler.run());

                prop_assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
                prop_assert_eq!(
                    stats.commands_processed.load(Ordering::Relaxed),
                    commands.len() as u64
                );
                prop_assert_eq!(stats.bytes_read.load(Ordering::Relaxed), stream.len() as u64);
                prop_assert_eq!(stats.protocol_errors.load(Ordering::Relaxed), 0);
            }
        }
    }
}
