//! Error types for the chat server
//!
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Connection-level I/O errors only ever end the affected session; the
/// configuration variants are fatal at startup.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the session or, at bind time, for the process)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Port argument is not a valid TCP port
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    /// Maximum connection argument is not a positive integer
    #[error("Invalid max connections: {0}")]
    InvalidMaxConnections(String),

    /// The admission pool was closed because the server is shutting down
    #[error("Admission controller closed")]
    AdmissionClosed,
}
