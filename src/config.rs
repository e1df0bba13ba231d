//! Server configuration.
//!
//! Besides the bind address, four constants govern the protocol layer:
//!
//! | Field | Bounds |
//! | --- | --- |
//! | `buffer_size` | initial stream buffer capacity, and the growth chunk |
//! | `max_read_iterations` | reads spent waiting on one header or payload |
//! | `max_arguments` | array length of a single command |
//! | `max_argument_size` | byte length of a single bulk string |
//!
//! Exceeding either of the last two is a protocol violation and closes the
//! connection.

use thiserror::Error;

/// Initial buffer capacity per connection
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// Reads allowed while waiting for one header or payload
pub const DEFAULT_MAX_READ_ITERATIONS: usize = 128;

/// Maximum number of arguments in one command
pub const DEFAULT_MAX_ARGUMENTS: usize = 128;

/// Maximum size of one argument in bytes
pub const DEFAULT_MAX_ARGUMENT_SIZE: usize = 128;

/// Upper bound accepted for `max_argument_size` (512 MB, same as Redis).
///
/// The stream buffer reserves room for a whole declared payload before its
/// bytes arrive, so this also caps the per-connection allocation.
pub const MAX_ARGUMENT_SIZE_LIMIT: usize = 512 * 1024 * 1024;

/// Errors raised by [`ServerConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} must be at most {max}")]
    TooLarge { name: &'static str, max: usize },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    pub buffer_size: usize,
    pub max_read_iterations: usize,
    pub max_arguments: usize,
    pub max_argument_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_read_iterations: DEFAULT_MAX_READ_ITERATIONS,
            max_arguments: DEFAULT_MAX_ARGUMENTS,
            max_argument_size: DEFAULT_MAX_ARGUMENT_SIZE,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects constants that would make every command fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("buffer_size", self.buffer_size),
            ("max_read_iterations", self.max_read_iterations),
            ("max_arguments", self.max_arguments),
            ("max_argument_size", self.max_argument_size),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero(*name));
        }
        if self.max_argument_size > MAX_ARGUMENT_SIZE_LIMIT {
            return Err(ConfigError::TooLarge {
                name: "max_argument_size",
                max: MAX_ARGUMENT_SIZE_LIMIT,
            });
        }
        Ok(())
    }
}
