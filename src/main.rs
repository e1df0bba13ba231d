//! respd - A Minimal RESP Server
//!
//! This is the main entry point for the respd server.
//! It parses the configuration, sets up logging, and runs the accept loop
//! until Ctrl+C.

use clap::Parser;
use respd::commands::CommandHandler;
use respd::config::{
    ServerConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_ARGUMENTS, DEFAULT_MAX_ARGUMENT_SIZE,
    DEFAULT_MAX_READ_ITERATIONS,
};
use respd::connection::ConnectionStats;
use respd::server;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A minimal RESP server.
#[derive(Parser, Debug)]
#[command(name = "respd", version, about)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "RESPD_HOST", default_value = respd::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "RESPD_PORT", default_value_t = respd::DEFAULT_PORT)]
    port: u16,

    /// Initial per-connection buffer size in bytes
    #[arg(long, env = "RESPD_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Reads allowed while waiting for one header or payload
    #[arg(long, env = "RESPD_MAX_READ_ITERATIONS", default_value_t = DEFAULT_MAX_READ_ITERATIONS)]
    max_read_iterations: usize,

    /// Maximum number of arguments in one command
    #[arg(long, env = "RESPD_MAX_ARGUMENTS", default_value_t = DEFAULT_MAX_ARGUMENTS)]
    max_arguments: usize,

    /// Maximum size of one argument in bytes
    #[arg(long, env = "RESPD_MAX_ARGUMENT_SIZE", default_value_t = DEFAULT_MAX_ARGUMENT_SIZE)]
    max_argument_size: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            buffer_size: args.buffer_size,
            max_read_iterations: args.max_read_iterations,
            max_arguments: args.max_arguments,
            max_argument_size: args.max_argument_size,
        }
    }
}

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
respd v{} - Minimal RESP Server
──────────────────────────────────────────
Server started on {}
Buffer {} B | max {} args x {} B | {} reads per unit
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        respd::VERSION,
        config.bind_address(),
        config.buffer_size,
        config.max_arguments,
        config.max_argument_size,
        config.max_read_iterations,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Args::parse());
    config.validate()?;

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    print_banner(&config);

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;

    // Set up graceful shutdown
    let shutdown = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received, stopping server...");
    };

    // Main accept loop
    tokio::select! {
        _ = server::run(listener, &config, CommandHandler::new(), Arc::clone(&stats)) => {}
        _ = shutdown => {}
    }

    info!(
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        protocol_errors = stats.protocol_errors.load(Ordering::Relaxed),
        bytes_read = stats.bytes_read.load(Ordering::Relaxed),
        bytes_written = stats.bytes_written.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}
