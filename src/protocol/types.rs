//! RESP (Redis Serialization Protocol) Data Types
//!
//! This module defines the values the server writes back to clients and the
//! sigil bytes the header scanner recognises.
//!
//! ## Protocol Format
//!
//! Each RESP type starts with a type prefix byte:
//! - `+` Simple String
//! - `-` Error
//! - `:` Integer
//! - `$` Bulk String
//! - `*` Array
//!
//! All types are terminated with CRLF (`\r\n`).
//!
//! ## Examples
//!
//! Simple String: `+PONG\r\n`
//! Error: `-1\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Array: `*1\r\n$4\r\nPING\r\n`

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';

    /// Returns true if `byte` opens a length-prefixed RESP header.
    #[inline]
    pub fn is_sigil(byte: u8) -> bool {
        matches!(
            byte,
            SIMPLE_STRING | ERROR | INTEGER | BULK_STRING | ARRAY
        )
    }
}

/// A value in the RESP protocol.
///
/// The server only ever emits replies, so this covers the encoding side:
/// simple strings and errors for status replies, bulk strings for echoed
/// payloads, and arrays of bulk strings for encoding commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// Format: `-<error message>\r\n`
    Error(String),

    /// Binary-safe string.
    /// Format: `$<length>\r\n<data>\r\n`
    BulkString(Bytes),

    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Creates a new error response.
    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    /// Creates an array value.
    pub fn array(values: Vec<RespValue>) -> Self {
        RespValue::Array(values)
    }

    /// Reply to a successful `QUIT`.
    ///
    /// # Example
    /// ```
    /// use respd::protocol::types::RespValue;
    /// assert_eq!(RespValue::ok().serialize(), b"+OK\r\n");
    /// ```
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn pong() -> Self {
        RespValue::SimpleString("PONG".to_string())
    }

    /// Serializes the RESP value to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the RESP value into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::Error(s) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespValue::BulkString(data) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            RespValue::Array(values) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
        }
    }
}

impl fmt::Display for RespValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespValue::SimpleString(s) => write!(f, "\"{}\"", s),
            RespValue::Error(s) => write!(f, "(error) {}", s),
            RespValue::BulkString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            RespValue::Array(values) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    writeln!(f)?;
                    for (i, v) in values.iter().enumerate() {
                        writeln!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_response() {
        assert_eq!(RespValue::pong().serialize(), b"+PONG\r\n");
    }

    #[test]
    fn test_unknown_command_reply() {
        assert_eq!(RespValue::error("1").serialize(), b"-1\r\n");
    }

    #[test]
    fn test_bulk_string_serialize() {
        let value = RespValue::BulkString(Bytes::from("hello"));
        assert_eq!(value.serialize(), b"$5\r\nhello\r\n");
    }

    #[test]
    fn test_command_array_serialize() {
        let value = RespValue::array(vec![
            RespValue::BulkString(Bytes::from("PING")),
            RespValue::BulkString(Bytes::from("hi")),
        ]);
        assert_eq!(value.serialize(), b"*2\r\n$4\r\nPING\r\n$2\r\nhi\r\n");
    }

    #[test]
    fn test_is_sigil() {
        for b in [b'+', b'-', b':', b'$', b'*'] {
            assert!(prefix::is_sigil(b));
        }
        assert!(!prefix::is_sigil(b'P'));
        assert!(!prefix::is_sigil(b'\r'));
    }

    #[test]
    fn test_display_binary_bulk() {
        let value = RespValue::BulkString(Bytes::from(&b"\xff\xfe"[..]));
        assert_eq!(value.to_string(), "(binary data, 2 bytes)");
    }
}
