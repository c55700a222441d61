//! Per-thread mutable state container.

use palaver_core::Message;
use tokio::sync::watch;

use crate::{message_map::MessageMap, observable::Observable};

/// Observable state of one thread: the replies of a parent message.
///
/// Shares the message-map primitives with [`crate::ChannelMutableState`],
/// so a message mirrored in both containers moves through the same
/// upsert/delete rules in each.
#[derive(Debug)]
pub struct ThreadMutableState {
    parent_id: String,
    messages: MessageMap,
    loading: Observable<bool>,
    end_of_older_replies: Observable<bool>,
}

impl ThreadMutableState {
    /// Create empty state for the thread rooted at `parent_id`.
    pub fn new(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            messages: MessageMap::default(),
            loading: Observable::new(false),
            end_of_older_replies: Observable::new(false),
        }
    }

    /// Id of the thread's root message.
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Insert or replace a reply under the monotonic "newest wins" rule.
    pub fn upsert_message(&self, message: Message) -> bool {
        self.messages.upsert(message)
    }

    /// Batch variant of [`Self::upsert_message`].
    pub fn upsert_messages(&self, messages: impl IntoIterator<Item = Message>) {
        self.messages.upsert_many(messages);
    }

    /// Mutate the stored copy of a reply in place. Returns whether the
    /// reply was present.
    pub fn update_message(&self, message_id: &str, mutate: impl FnOnce(&mut Message)) -> bool {
        self.messages.update_in_place(message_id, mutate)
    }

    /// Remove a reply by id.
    pub fn delete_message(&self, message_id: &str) -> bool {
        self.messages.remove(message_id)
    }

    /// Stored copy of one reply.
    pub fn message(&self, message_id: &str) -> Option<Message> {
        self.messages.get(message_id)
    }

    /// Whether the thread currently holds this reply.
    pub fn contains_message(&self, message_id: &str) -> bool {
        self.messages.contains(message_id)
    }

    /// Display-ordered snapshot of the replies.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.sorted()
    }

    /// Subscribe to display-ordered snapshot changes.
    pub fn subscribe_messages(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.subscribe_sorted()
    }

    /// Unordered snapshot, for sync sweeps.
    pub fn all_messages(&self) -> Vec<Message> {
        self.messages.values()
    }

    /// Whether a reply-pagination request is in flight.
    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    /// Set the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    /// Whether older-reply pagination is exhausted.
    pub fn end_of_older_replies(&self) -> bool {
        self.end_of_older_replies.get()
    }

    /// Set the older-reply pagination boundary flag.
    pub fn set_end_of_older_replies(&self, end: bool) {
        self.end_of_older_replies.set(end);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use palaver_core::SyncStatus;

    use super::*;

    #[test]
    fn replies_sort_by_creation_time() {
        let thread = ThreadMutableState::new("root");
        for (id, secs) in [("r2", 20), ("r1", 10)] {
            thread.upsert_message(Message {
                id: id.into(),
                parent_id: Some("root".into()),
                created_at: Some(Utc.timestamp_opt(secs, 0).single().unwrap()),
                sync_status: SyncStatus::Completed,
                ..Message::default()
            });
        }

        let ids: Vec<String> = thread.messages().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["r1", "r2"]);
    }
}
