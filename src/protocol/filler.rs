//! Incremental Filler
//!
//! Bridges the scanner and the socket: when the buffered bytes are not
//! enough, read once more and try again. The number of reads spent on a
//! single header or payload is capped, so a client that stalls or trickles
//! bytes cannot hold a connection open forever. The cap counts reads, not
//! elapsed time.

use super::buffer::StreamBuffer;
use super::error::CommandError;
use super::scanner::{scan_header, Header};
use tokio::io::AsyncRead;
use tracing::trace;

/// Retries scans and payload waits against a bounded number of reads.
#[derive(Debug, Clone, Copy)]
pub struct Filler {
    max_reads: usize,
}

impl Filler {
    pub fn new(max_reads: usize) -> Self {
        Self { max_reads }
    }

    /// Scans one header at the cursor, reading more bytes while it is
    /// incomplete, then advances the cursor past it.
    pub async fn read_header<R>(
        &self,
        reader: &mut R,
        buffer: &mut StreamBuffer,
    ) -> Result<Header, CommandError>
    where
        R: AsyncRead + Unpin,
    {
        let mut attempts = 0;
        loop {
            if let Some(header) = scan_header(buffer.unconsumed())? {
                trace!(
                    sigil = ?header.sigil.map(char::from),
                    value = header.value,
                    "Scanned header"
                );
                buffer.advance(header.offset);
                return Ok(header);
            }

            if attempts == self.max_reads {
                return Err(CommandError::ReadLimitExceeded { attempts });
            }
            attempts += 1;
            trace!(attempt = attempts, "Incomplete header, reading more");
            buffer.fill(reader, true).await?;
        }
    }

    /// Waits until at least `needed` unparsed bytes are buffered.
    pub async fn require<R>(
        &self,
        reader: &mut R,
        buffer: &mut StreamBuffer,
        needed: usize,
    ) -> Result<(), CommandError>
    where
        R: AsyncRead + Unpin,
    {
        if buffer.available() >= needed {
            return Ok(());
        }
        buffer.reserve(needed - buffer.available());

        let mut attempts = 0;
        while buffer.available() < needed {
            if attempts == self.max_reads {
                return Err(CommandError::ReadLimitExceeded { attempts });
            }
            attempts += 1;
            trace!(
                attempt = attempts,
                have = buffer.available(),
                needed,
                "Incomplete payload, reading more"
            );
            buffer.fill(reader, true).await?;
        }
        Ok(())
    }
}
