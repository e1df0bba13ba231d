//! TCP accept loop.
//!
//! One tokio task per accepted connection, no admission control. Each task
//! owns its socket and stream buffer; both are released when the task ends.

use crate::commands::CommandHandler;
use crate::config::ServerConfig;
use crate::connection::{handle_connection, ConnectionStats};
use crate::protocol::CommandAssembler;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Accepts connections on `listener` forever.
///
/// Accept failures are logged and the loop keeps going.
pub async fn run(
    listener: TcpListener,
    config: &ServerConfig,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let assembler = CommandAssembler::from_config(config);
    let buffer_size = config.buffer_size;

    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, buffer_size, assembler, command_handler, stats)
                        .await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
