//! Multi-user TCP Chat Server Library
//!
//! A minimal line-based chat server built on tokio. Every client picks a
//! username and then sees every other client's messages, never its own.
//!
//! # Protocol
//! - Server → client on connect: `Enter your username: `
//! - Client → server, first line: the username (may be empty)
//! - Client → server, every later line: a chat message
//! - Server → client, per message from another author: ` > (<author>) : <content>\n`
//!
//! # Architecture
//! - `ChatServer` accepts connections while a permit from `Admission` is free
//! - Each connection runs `handle_connection` with two relay tasks:
//!   inbound (socket → `MessageLog`) and outbound (`MessageLog` → socket)
//! - The append-only `MessageLog` is the only state shared between sessions;
//!   outbound relays sleep on its length watcher instead of polling
//!
//! # Example
//! ```ignore
//! use socket_chat_server::{ChatServer, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let server = ChatServer::bind(&config).await.unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod admission;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod message;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use admission::{Admission, Permit};
pub use client::ClientState;
pub use config::Config;
pub use error::AppError;
pub use handler::handle_connection;
pub use history::MessageLog;
pub use message::{Message, USERNAME_PROMPT};
pub use server::ChatServer;
pub use types::SessionId;
