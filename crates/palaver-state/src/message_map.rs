//! Shared message-map primitives for channel and thread containers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use palaver_core::Message;
use tokio::sync::watch;

use crate::observable::Observable;

/// Backing message store of a container: an id-keyed map plus a derived
/// sorted snapshot published to the UI.
///
/// This is the single source of truth for how a message enters or leaves a
/// container; both the listener protocol and the server event handler go
/// through it.
#[derive(Debug, Default)]
pub(crate) struct MessageMap {
    by_id: Observable<HashMap<String, Message>>,
    sorted: Observable<Vec<Message>>,
}

impl MessageMap {
    /// Insert or replace a message, keeping the "newest wins" order
    /// monotonic: the incoming copy replaces a stored one only when
    /// strictly newer (see [`Message::is_newer_than`]). Re-applying the
    /// same message, or an older version, is a no-op.
    ///
    /// Returns whether the map changed.
    pub(crate) fn upsert(&self, message: Message) -> bool {
        let mut changed = false;
        self.by_id.update(|map| match map.get(&message.id) {
            Some(stored) if !message.is_newer_than(stored) => {},
            _ => {
                map.insert(message.id.clone(), message);
                changed = true;
            },
        });
        if changed {
            self.publish_sorted();
        }
        changed
    }

    /// Batch upsert; publishes the sorted snapshot once.
    pub(crate) fn upsert_many(&self, messages: impl IntoIterator<Item = Message>) {
        let mut changed = false;
        self.by_id.update(|map| {
            for message in messages {
                match map.get(&message.id) {
                    Some(stored) if !message.is_newer_than(stored) => {},
                    _ => {
                        map.insert(message.id.clone(), message);
                        changed = true;
                    },
                }
            }
        });
        if changed {
            self.publish_sorted();
        }
    }

    /// Mutate the stored copy of a message in place. Unlike
    /// [`upsert`](Self::upsert) this edits the current version directly
    /// (reaction lists and sync-status transitions are not guarded by the
    /// version stamps). Returns whether the message was present.
    pub(crate) fn update_in_place(
        &self,
        message_id: &str,
        mutate: impl FnOnce(&mut Message),
    ) -> bool {
        let mut found = false;
        self.by_id.update(|map| {
            if let Some(stored) = map.get_mut(message_id) {
                mutate(stored);
                found = true;
            }
        });
        if found {
            self.publish_sorted();
        }
        found
    }

    /// Remove a message by id. Absent ids are a no-op.
    pub(crate) fn remove(&self, message_id: &str) -> bool {
        let mut changed = false;
        self.by_id.update(|map| {
            changed = map.remove(message_id).is_some();
        });
        if changed {
            self.publish_sorted();
        }
        changed
    }

    /// Drop every message created at or before `truncated_at`; `None`
    /// clears the map.
    pub(crate) fn truncate(&self, truncated_at: Option<DateTime<Utc>>) {
        self.by_id.update(|map| match truncated_at {
            Some(cutoff) => map.retain(|_, m| m.effective_created_at() > cutoff),
            None => map.clear(),
        });
        self.publish_sorted();
    }

    /// Stored copy of a message, if present.
    pub(crate) fn get(&self, message_id: &str) -> Option<Message> {
        self.by_id.with(|map| map.get(message_id).cloned())
    }

    /// Whether the map holds a message with this id.
    pub(crate) fn contains(&self, message_id: &str) -> bool {
        self.by_id.with(|map| map.contains_key(message_id))
    }

    /// Sorted snapshot, ascending by effective creation time.
    pub(crate) fn sorted(&self) -> Vec<Message> {
        self.sorted.get()
    }

    /// Subscribe to sorted-snapshot changes.
    pub(crate) fn subscribe_sorted(&self) -> watch::Receiver<Vec<Message>> {
        self.sorted.subscribe()
    }

    /// All stored messages, unordered.
    pub(crate) fn values(&self) -> Vec<Message> {
        self.by_id.with(|map| map.values().cloned().collect())
    }

    fn publish_sorted(&self) {
        let mut messages = self.values();
        // Id tiebreak keeps the order total, so equal-stamp messages
        // cannot swap between recomputations.
        messages.sort_by(|a, b| {
            a.effective_created_at().cmp(&b.effective_created_at()).then_with(|| a.id.cmp(&b.id))
        });
        self.sorted.set(messages);
    }
}
