//! Length-Prefix Scanner
//!
//! Parses one RESP header (`*3\r\n`, `$5\r\n`, ...) out of whatever prefix of
//! the buffer is currently available.
//!
//! The scanner follows the same three-way contract as the rest of the
//! protocol layer:
//! - `Ok(Some(header))` - a complete header was found
//! - `Ok(None)` - the slice ends before the header does, read more
//! - `Err(e)` - the bytes can never form a valid header
//!
//! A slice whose first byte is not one of the five RESP sigils is reported
//! as a complete header with value 0 and offset 0. Callers that require a
//! non-zero count reject it from there.

use super::error::CommandError;
use super::types::prefix;

/// Result type for header scanning.
pub type ScanResult = Result<Option<Header>, CommandError>;

/// A decoded RESP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The sigil that opened the header, or `None` on the no-op path
    pub sigil: Option<u8>,
    /// Decoded decimal value
    pub value: usize,
    /// Offset just past the terminating CRLF, relative to the scan start
    pub offset: usize,
}

impl Header {
    /// The header reported for a slice that does not start with a sigil.
    pub const NONE: Header = Header {
        sigil: None,
        value: 0,
        offset: 0,
    };
}

/// Scans a header from the start of `buf`.
///
/// # Example
///
/// ```
/// use respd::protocol::scanner::scan_header;
///
/// let header = scan_header(b"$5\r\nhello\r\n").unwrap().unwrap();
/// assert_eq!(header.value, 5);
/// assert_eq!(header.offset, 4);
///
/// assert!(scan_header(b"$5\r").unwrap().is_none());
/// ```
pub fn scan_header(buf: &[u8]) -> ScanResult {
    if buf.len() < 2 {
        return Ok(None);
    }

    let sigil = buf[0];
    if !prefix::is_sigil(sigil) {
        return Ok(Some(Header::NONE));
    }

    let mut value: usize = 0;
    for (i, &byte) in buf.iter().enumerate().skip(1) {
        if byte == b'\r' {
            return match buf.get(i + 1) {
                None => Ok(None),
                Some(b'\n') => Ok(Some(Header {
                    sigil: Some(sigil),
                    value,
                    offset: i + 2,
                })),
                Some(_) => Err(CommandError::MissingLineFeed),
            };
        }

        if !byte.is_ascii_digit() {
            return Err(CommandError::InvalidLength(byte));
        }

        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(usize::from(byte - b'0')))
            .ok_or(CommandError::LengthOverflow)?;
    }

    Ok(None)
}
