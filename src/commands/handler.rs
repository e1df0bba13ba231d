//! Dispatches assembled commands to their replies.
//!
//! The handler is a pure function of the command's arguments; it holds no
//! state and is cheap to clone into every connection task.

use crate::protocol::{Command, RespValue};

/// Reply for any command the handler does not recognise
const UNKNOWN_COMMAND_REPLY: &str = "1";

/// What to send back for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The reply to write
    pub value: RespValue,
    /// Close the connection once the reply is written
    pub close: bool,
}

impl Response {
    /// A reply after which the connection stays open.
    pub fn reply(value: RespValue) -> Self {
        Self {
            value,
            close: false,
        }
    }

    /// A reply after which the connection is closed.
    pub fn closing(value: RespValue) -> Self {
        Self { value, close: true }
    }
}

/// Handles commands by dispatching them on their (case-insensitive) name.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Executes a command and returns the response.
    pub fn execute(&self, command: &Command) -> Response {
        let name = command.name();

        if name.eq_ignore_ascii_case(b"PING") {
            Response::reply(RespValue::pong())
        } else if name.eq_ignore_ascii_case(b"QUIT") {
            Response::closing(RespValue::ok())
        } else {
            Response::reply(RespValue::error(UNKNOWN_COMMAND_REPLY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&'static str]) -> Response {
        CommandHandler::new().execute(&Command::from_args(args.iter().copied()))
    }

    #[test]
    fn test_ping() {
        let response = run(&["PING"]);
        assert_eq!(response.value.serialize(), b"+PONG\r\n");
        assert!(!response.close);
    }

    #[test]
    fn test_ping_case_insensitive() {
        assert_eq!(run(&["ping"]).value, RespValue::pong());
        assert_eq!(run(&["PiNg"]).value, RespValue::pong());
    }

    #[test]
    fn test_ping_ignores_arguments() {
        assert_eq!(run(&["PING", "hello"]).value.serialize(), b"+PONG\r\n");
        assert_eq!(run(&["ping", "a", "b"]).value.serialize(), b"+PONG\r\n");
    }

    #[test]
    fn test_unknown_command() {
        let response = run(&["PONG"]);
        assert_eq!(response.value.serialize(), b"-1\r\n");
        assert!(!response.close);
    }

    #[test]
    fn test_quit_closes() {
        let response = run(&["quit"]);
        assert_eq!(response.value.serialize(), b"+OK\r\n");
        assert!(response.close);
    }
}
