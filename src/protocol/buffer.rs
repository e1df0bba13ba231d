//! Stream Buffer
//!
//! An owned byte arena with two indices, decoupling "bytes received from the
//! socket" from "bytes already consumed as RESP content".
//!
//! ```text
//!  0            cursor            size                 capacity
//!  ├──consumed───┼────unparsed─────┼───────spare─────────┤
//! ```
//!
//! - `[0, cursor)` belongs to commands that were already parsed and dispatched
//! - `[cursor, size)` is protocol content not yet parsed
//! - `[size, capacity)` is stale and gets overwritten by the next read
//!
//! Between pipelined commands the driver either [`reset`](StreamBuffer::reset)s
//! the buffer (everything was consumed) or [`compact`](StreamBuffer::compact)s
//! it (the tail belongs to the next command).

use super::error::CommandError;
use super::types::CRLF;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// Per-connection receive buffer.
#[derive(Debug)]
pub struct StreamBuffer {
    /// Backing storage; its length is the buffer's capacity
    bytes: Vec<u8>,
    /// Count of valid bytes received
    size: usize,
    /// Index of the next unconsumed byte
    cursor: usize,
    /// Size of the chunk appended when a read needs more room
    chunk: usize,
    /// Total bytes read over the buffer's lifetime
    received: u64,
}

impl StreamBuffer {
    /// Creates a buffer with `capacity` bytes of storage.
    ///
    /// The same value is used as the growth chunk for later reads.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bytes: vec![0; capacity],
            size: 0,
            cursor: 0,
            chunk: capacity,
            received: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Number of valid bytes held.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes received but not yet parsed.
    pub fn unconsumed(&self) -> &[u8] {
        &self.bytes[self.cursor..self.size]
    }

    /// Number of bytes received but not yet parsed.
    pub fn available(&self) -> usize {
        self.size - self.cursor
    }

    /// True when every received byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.size
    }

    pub fn total_received(&self) -> u64 {
        self.received
    }

    fn spare(&self) -> usize {
        self.bytes.len() - self.size
    }

    /// Makes sure at least `additional` bytes of spare room follow `size`,
    /// reallocating the storage if it is too small.
    pub fn reserve(&mut self, additional: usize) {
        if self.spare() < additional {
            let new_len = self.size + additional;
            trace!(from = self.bytes.len(), to = new_len, "Growing stream buffer");
            self.bytes.resize(new_len, 0);
        }
    }

    /// Reads once from `reader` into the spare region.
    ///
    /// With `grow = false` the read lands in the existing storage, which is
    /// what the driver wants right after a [`reset`](Self::reset). With
    /// `grow = true` a fresh chunk is appended first if the spare region is
    /// smaller than one chunk, so bytes already buffered are never discarded.
    ///
    /// Returns the number of bytes read. A read of zero bytes means the peer
    /// closed the stream and is reported as [`CommandError::Closed`].
    pub async fn fill<R>(&mut self, reader: &mut R, grow: bool) -> Result<usize, CommandError>
    where
        R: AsyncRead + Unpin,
    {
        if grow || self.spare() == 0 {
            self.reserve(self.chunk);
        }

        let n = reader.read(&mut self.bytes[self.size..]).await?;
        if n == 0 {
            return Err(CommandError::Closed {
                buffered: self.available(),
            });
        }

        self.size += n;
        self.received += n as u64;
        trace!(bytes = n, size = self.size, cursor = self.cursor, "Filled stream buffer");
        Ok(n)
    }

    /// Moves the cursor forward by `n` bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.cursor + n <= self.size, "advance past received bytes");
        self.cursor = (self.cursor + n).min(self.size);
    }

    /// Extracts a `len`-byte payload at the cursor and steps over it and its
    /// trailing CRLF.
    ///
    /// The caller must already have made sure `len + 2` bytes are available.
    pub fn take_payload(&mut self, len: usize) -> Result<Bytes, CommandError> {
        let start = self.cursor;
        let end = start + len;
        if end + CRLF.len() > self.size {
            return Err(CommandError::Closed {
                buffered: self.available(),
            });
        }
        if &self.bytes[end..end + CRLF.len()] != CRLF {
            return Err(CommandError::MissingTerminator);
        }

        let payload = Bytes::copy_from_slice(&self.bytes[start..end]);
        self.cursor = end + CRLF.len();
        Ok(payload)
    }

    /// Discards `[0, cursor)` and shifts the unparsed remainder to the front.
    pub fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.bytes.copy_within(self.cursor..self.size, 0);
        self.size -= self.cursor;
        self.cursor = 0;
        trace!(residue = self.size, "Compacted stream buffer");
    }

    /// Logically empties the buffer without touching its capacity.
    pub fn reset(&mut self) {
        self.size = 0;
        self.cursor = 0;
    }
}
