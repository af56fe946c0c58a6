//! ChatServer accept loop
//!
//! Takes an admission permit, accepts a connection, and hands both to a new
//! session task. Sessions run independently of the loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::admission::Admission;
use crate::config::Config;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::history::MessageLog;
use crate::types::SessionId;

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The chat server
///
/// Owns the listener, the admission pool and the shared message log.
pub struct ChatServer {
    listener: TcpListener,
    admission: Admission,
    log: Arc<MessageLog>,
}

impl ChatServer {
    /// Bind a listener for the given configuration
    pub async fn bind(config: &Config) -> Result<Self, AppError> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        Ok(Self::new(listener, config.max_connections))
    }

    /// Create a server around an already bound listener
    pub fn new(listener: TcpListener, max_connections: usize) -> Self {
        Self {
            listener,
            admission: Admission::new(max_connections),
            log: Arc::new(MessageLog::new()),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared message log
    pub fn log(&self) -> Arc<MessageLog> {
        Arc::clone(&self.log)
    }

    /// Run the accept loop forever
    pub async fn run(self) -> Result<(), AppError> {
        self.run_until(std::future::pending()).await
    }

    /// Run the accept loop until `shutdown` resolves
    ///
    /// Only the listener stops and the admission pool is closed; sessions
    /// already running continue until their connections end.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Accepting up to {} concurrent clients",
            self.admission.capacity()
        );

        loop {
            let permit = tokio::select! {
                permit = self.admission.acquire() => permit?,
                _ = &mut shutdown => break,
            };

            let accepted = tokio::select! {
                accepted = self.listener.accept() => accepted,
                _ = &mut shutdown => break,
            };

            match accepted {
                Ok((stream, addr)) => {
                    let session_id = SessionId::new();
                    info!("New client {} connected from {}", session_id, addr);
                    debug!("Free slots: {}", self.admission.available());

                    let log = Arc::clone(&self.log);

                    // Spawn session task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, session_id, log, permit).await {
                            error!("Session {} error: {}", session_id, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    drop(permit);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }

        self.admission.close();
        info!("ChatServer shutting down");
        Ok(())
    }
}
