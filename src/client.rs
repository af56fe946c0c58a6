//! Per-session client state
//!
//! Shared by the inbound and outbound relays of one session: the username
//! cell and the liveness flag.

use std::sync::Arc;

use tokio::sync::watch;

/// State handed off between the two relays of a session
///
/// Both fields are published through `watch` channels so the outbound relay
/// can sleep until the username arrives or the session closes.
#[derive(Debug)]
pub struct ClientState {
    /// Username (None before the handshake line arrives)
    username: watch::Sender<Option<Arc<str>>>,
    /// Cleared when either relay stops
    live: watch::Sender<bool>,
}

impl ClientState {
    pub fn new() -> Self {
        let (username, _) = watch::channel(None);
        let (live, _) = watch::channel(true);
        Self { username, live }
    }

    /// Set the username if it has not been set yet
    ///
    /// Returns false, leaving the cell untouched, on every call after the first.
    pub fn set_username(&self, username: String) -> bool {
        self.username.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(Arc::from(username));
            true
        })
    }

    /// Get the username, if the handshake has completed
    pub fn username(&self) -> Option<Arc<str>> {
        self.username.borrow().clone()
    }

    /// Wait until the username is set
    ///
    /// Returns None if the session closes before that happens.
    pub async fn wait_username(&self) -> Option<Arc<str>> {
        let mut rx = self.username.subscribe();
        let set = async move {
            let name = rx.wait_for(Option::is_some).await.ok()?;
            name.clone()
        };
        tokio::select! {
            name = set => name,
            _ = self.closed() => None,
        }
    }

    pub fn is_live(&self) -> bool {
        *self.live.borrow()
    }

    /// Mark the session as closed, waking anything in `closed()`
    pub fn mark_closed(&self) {
        self.live.send_replace(false);
    }

    /// Resolve once the session has been marked closed
    pub async fn closed(&self) {
        let mut rx = self.live.subscribe();
        // The sender lives in `self`, so this only returns once the flag drops.
        let _ = rx.wait_for(|live| !*live).await;
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
