//! Socket Chat Server - Entry Point
//!
//! Parses the configuration, binds the listener and runs the accept loop
//! until Ctrl-C.

use std::env;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use socket_chat_server::{ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=socket_chat_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("socket_chat_server=info")),
        )
        .init();

    // Usage: socket_chat_server [port] [max_connections]
    let config = Config::from_args(env::args().skip(1))?;

    // Bind failure is fatal
    let server = ChatServer::bind(&config).await?;
    info!("Chat Server listening on {}", server.local_addr()?);

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
