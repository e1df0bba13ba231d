//! Errors raised while assembling a command from the byte stream.
//!
//! Every variant is fatal to the connection that produced it. The driver
//! never tries to resynchronize a stream after one of these.

use thiserror::Error;

/// Errors that abort reading a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The socket returned an I/O error while filling the buffer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream (read returned 0 bytes)
    #[error("connection closed with {buffered} unparsed bytes buffered")]
    Closed { buffered: usize },

    /// A header contained a byte that is not an ASCII digit
    #[error("invalid length byte: {0:#04x}")]
    InvalidLength(u8),

    /// A header declared a length that does not fit in `usize`
    #[error("length overflow")]
    LengthOverflow,

    /// `\r` in a header was followed by something other than `\n`
    #[error("header missing line feed after carriage return")]
    MissingLineFeed,

    /// The array header declared zero elements
    #[error("empty command array")]
    EmptyArray,

    /// The array header declared more elements than allowed
    #[error("too many arguments: {count} (max: {max})")]
    TooManyArguments { count: usize, max: usize },

    /// A bulk string header declared zero bytes
    #[error("empty argument")]
    EmptyArgument,

    /// A bulk string header declared more bytes than allowed
    #[error("argument too large: {size} bytes (max: {max})")]
    ArgumentTooLarge { size: usize, max: usize },

    /// The two bytes following a payload were not CRLF
    #[error("argument missing trailing CRLF")]
    MissingTerminator,

    /// The peer did not complete a header or payload within the read budget
    #[error("read limit exceeded after {attempts} reads")]
    ReadLimitExceeded { attempts: usize },
}

impl CommandError {
    /// Returns true for errors caused by the bytes the client sent, as opposed
    /// to the transport failing underneath us.
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(self, CommandError::Io(_) | CommandError::Closed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_classification() {
        assert!(CommandError::EmptyArray.is_protocol_violation());
        assert!(CommandError::ReadLimitExceeded { attempts: 3 }.is_protocol_violation());
        assert!(!CommandError::Closed { buffered: 0 }.is_protocol_violation());

        let io = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert!(!CommandError::from(io).is_protocol_violation());
    }

    #[test]
    fn test_display() {
        let err = CommandError::ArgumentTooLarge { size: 999, max: 128 };
        assert_eq!(err.to_string(), "argument too large: 999 bytes (max: 128)");
    }
}
