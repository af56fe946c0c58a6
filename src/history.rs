//! Shared message log
//!
//! The only state mutated by more than one session. Append-only: an index,
//! once populated, is never altered and the length never decreases.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

use crate::message::Message;

/// Append-only, ordered log of every posted message
///
/// Insertion order is delivery order. The current length is published on a
/// `watch` channel after each append so outbound relays can sleep until
/// something new arrives.
#[derive(Debug)]
pub struct MessageLog {
    entries: RwLock<Vec<Arc<Message>>>,
    len_tx: watch::Sender<usize>,
}

impl MessageLog {
    pub fn new() -> Self {
        let (len_tx, _) = watch::channel(0);
        Self {
            entries: RwLock::new(Vec::new()),
            len_tx,
        }
    }

    /// Append a message and wake every subscriber
    ///
    /// Returns the new length of the log.
    pub fn append(&self, message: Message) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(Arc::new(message));
        let len = entries.len();
        // Published under the write lock so watchers never see lengths go backwards.
        self.len_tx.send_replace(len);
        len
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get every entry at or after `cursor`, in log order
    pub fn since(&self, cursor: usize) -> Vec<Arc<Message>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(cursor..)
            .map(|tail| tail.to_vec())
            .unwrap_or_default()
    }

    /// Subscribe to length changes
    ///
    /// The receiver is signalled after every append.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.len_tx.subscribe()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_append_grows_monotonically() {
        let log = MessageLog::new();
        assert!(log.is_empty());

        assert_eq!(log.append(Message::new("alice", "one")), 1);
        assert_eq!(log.append(Message::new("bob", "two")), 2);
        assert_eq!(log.len(), 2);

        let all = log.since(0);
        assert_eq!(*all[0], Message::new("alice", "one"));
        assert_eq!(*all[1], Message::new("bob", "two"));
    }

    #[test]
    fn test_since_returns_tail() {
        let log = MessageLog::new();
        log.append(Message::new("a", "1"));
        log.append(Message::new("a", "2"));
        log.append(Message::new("a", "3"));

        let tail: Vec<_> = log.since(1).iter().map(|m| m.content.clone()).collect();
        assert_eq!(tail, vec!["2", "3"]);
        assert!(log.since(3).is_empty());
        assert!(log.since(10).is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_woken_on_append() {
        let log = Arc::new(MessageLog::new());
        let mut len_rx = log.subscribe();

        let writer = Arc::clone(&log);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.append(Message::new("alice", "hi"));
        });

        tokio::time::timeout(Duration::from_secs(2), len_rx.changed())
            .await
            .expect("append should wake subscriber")
            .unwrap();
        assert_eq!(*len_rx.borrow(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_every_entry() {
        let log = Arc::new(MessageLog::new());
        let mut tasks = Vec::new();

        for author in 0..8 {
            let log = Arc::clone(&log);
            tasks.push(tokio::spawn(async move {
                for i in 0..50 {
                    log.append(Message::new(author.to_string(), i.to_string()));
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(log.len(), 400);

        // Per-author order is preserved within the global order.
        let entries = log.since(0);
        for author in 0..8 {
            let author = author.to_string();
            let seq: Vec<usize> = entries
                .iter()
                .filter(|m| m.author == author)
                .map(|m| m.content.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..50).collect::<Vec<_>>());
        }
    }
}
