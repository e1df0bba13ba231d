//! Command Handler Module
//!
//! This module is the consumer of the protocol layer. It receives fully
//! assembled commands and decides what to send back, and whether the
//! connection should stay open afterwards.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌───────────────────┐
//! │ CommandAssembler  │  (protocol module)
//! └────────┬──────────┘
//!          │ Command
//!          ▼
//! ┌───────────────────┐
//! │  CommandHandler   │  (this module)
//! └────────┬──────────┘
//!          │ Response
//!          ▼
//!   reply written, connection kept or closed
//! ```
//!
//! ## Supported Commands
//!
//! - `PING` (any arguments are ignored)
//! - `QUIT`
//!
//! Anything else is answered with `-1`.

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandHandler, Response};
