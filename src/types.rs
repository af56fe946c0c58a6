//! Basic type definitions for the chat server
//!
//! - `SessionId`: log-correlation id for one accepted connection

use uuid::Uuid;

/// Log-correlation id for a session
///
/// Assigned by the accept loop and carried into both relay tasks so every
/// log line about one connection (connect, username, posts, I/O errors,
/// disconnect) can be grouped, even before a username exists or when two
/// clients share a name. Wraps a UUID v4; never written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
