//! Message record and line protocol
//!
//! The protocol is newline-delimited UTF-8 text with no framing beyond that:
//! the server prompts for a username, the first client line is the username,
//! every later line is a chat message.

/// Prompt written to a client as soon as it is accepted (no trailing newline)
pub const USERNAME_PROMPT: &str = "Enter your username: ";

/// A posted chat message
///
/// Created once by the inbound relay of the author's session and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Username of the session that posted the message
    pub author: String,
    /// Line content, without the line terminator
    pub content: String,
}

impl Message {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// Check whether this message was posted under `username`
    ///
    /// Exact comparison; the empty username is an ordinary name.
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.author == username
    }

    /// Render the message as it is written to other clients
    pub fn render(&self) -> String {
        format!(" > ({}) : {}\n", self.author, self.content)
    }
}
