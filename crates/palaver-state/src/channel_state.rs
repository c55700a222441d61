//! Per-channel mutable state container.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use palaver_core::{ChannelConfig, ChannelUserRead, Cid, Message, User};
use tokio::sync::watch;

use crate::{message_map::MessageMap, observable::Observable};

/// Observable state of one channel: its message map, typing set, read
/// markers, loading and pagination flags.
///
/// Created lazily by the registry on first access, dropped on sign-out or
/// on a channel-deleted event. Mutation methods are the single writer for
/// each published snapshot; reads may happen from any thread.
#[derive(Debug)]
pub struct ChannelMutableState {
    cid: Cid,
    messages: MessageMap,
    config: Observable<ChannelConfig>,
    typing: Observable<HashMap<String, User>>,
    reads: Observable<Vec<ChannelUserRead>>,
    loading: Observable<bool>,
    end_of_older_messages: Observable<bool>,
    end_of_newer_messages: Observable<bool>,
    /// When the current user last sent a typing-start event; gates the
    /// typing cooldown. Cleared by typing-stop.
    last_typing_start: Mutex<Option<DateTime<Utc>>>,
}

impl ChannelMutableState {
    /// Create empty state for the given channel.
    pub fn new(cid: Cid) -> Self {
        Self {
            cid,
            messages: MessageMap::default(),
            config: Observable::default(),
            typing: Observable::default(),
            reads: Observable::default(),
            loading: Observable::new(false),
            end_of_older_messages: Observable::new(false),
            end_of_newer_messages: Observable::new(true),
            last_typing_start: Mutex::new(None),
        }
    }

    /// The channel this container belongs to.
    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    // --- messages -------------------------------------------------------

    /// Insert or replace a message under the monotonic "newest wins"
    /// rule. Returns whether anything changed.
    pub fn upsert_message(&self, message: Message) -> bool {
        self.messages.upsert(message)
    }

    /// Batch variant of [`Self::upsert_message`].
    pub fn upsert_messages(&self, messages: impl IntoIterator<Item = Message>) {
        self.messages.upsert_many(messages);
    }

    /// Mutate the stored copy of a message in place (reaction lists,
    /// sync-status transitions). Returns whether the message was present.
    pub fn update_message(&self, message_id: &str, mutate: impl FnOnce(&mut Message)) -> bool {
        self.messages.update_in_place(message_id, mutate)
    }

    /// Remove a message by id.
    pub fn delete_message(&self, message_id: &str) -> bool {
        self.messages.remove(message_id)
    }

    /// Drop messages created at or before the cutoff (`None` clears all).
    pub fn truncate(&self, truncated_at: Option<DateTime<Utc>>) {
        self.messages.truncate(truncated_at);
    }

    /// Stored copy of one message.
    pub fn message(&self, message_id: &str) -> Option<Message> {
        self.messages.get(message_id)
    }

    /// Whether the container currently holds this message.
    pub fn contains_message(&self, message_id: &str) -> bool {
        self.messages.contains(message_id)
    }

    /// Display-ordered snapshot (ascending by effective creation time).
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

    // --- config ---------------------------------------------------------

    /// Current channel feature flags.
    pub fn config(&self) -> ChannelConfig {
        self.config.get()
    }

    /// Replace the channel feature flags.
    pub fn set_config(&self, config: ChannelConfig) {
        self.config.set(config);
    }

    // --- typing ---------------------------------------------------------

    /// Record that `user` is typing.
    pub fn set_typing(&self, user: User) {
        self.typing.update(|map| {
            map.insert(user.id.clone(), user);
        });
    }

    /// Record that the user with `user_id` stopped typing.
    pub fn clear_typing(&self, user_id: &str) {
        self.typing.update(|map| {
            map.remove(user_id);
        });
    }

    /// Users currently typing, ordered by id for determinism.
    pub fn typing_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.typing.with(|map| map.values().cloned().collect());
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }

    /// Subscribe to typing-set changes.
    pub fn subscribe_typing(&self) -> watch::Receiver<HashMap<String, User>> {
        self.typing.subscribe()
    }

    /// When the current user last sent typing-start, if a start is
    /// outstanding.
    pub fn last_typing_start(&self) -> Option<DateTime<Utc>> {
        *self.last_typing_start.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record or clear the outstanding typing-start stamp.
    pub fn set_last_typing_start(&self, stamp: Option<DateTime<Utc>>) {
        *self.last_typing_start.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = stamp;
    }

    // --- reads ----------------------------------------------------------

    /// Insert or replace the read marker of `read.user`.
    pub fn upsert_read(&self, read: ChannelUserRead) {
        self.reads.update(|reads| {
            match reads.iter_mut().find(|r| r.user.id == read.user.id) {
                Some(existing) => *existing = read,
                None => reads.push(read),
            }
        });
    }

    /// All read markers.
    pub fn reads(&self) -> Vec<ChannelUserRead> {
        self.reads.get()
    }

    /// Read marker of one user.
    pub fn read(&self, user_id: &str) -> Option<ChannelUserRead> {
        self.reads.with(|reads| reads.iter().find(|r| r.user.id == user_id).cloned())
    }

    /// Subscribe to read-marker changes.
    pub fn subscribe_reads(&self) -> watch::Receiver<Vec<ChannelUserRead>> {
        self.reads.subscribe()
    }

    // --- loading and pagination ----------------------------------------

    /// Whether an initial load or pagination request is in flight.
    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    /// Set the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    /// Whether older-message pagination is exhausted (start of channel
    /// reached).
    pub fn end_of_older_messages(&self) -> bool {
        self.end_of_older_messages.get()
    }

    /// Set the older-pagination boundary flag.
    pub fn set_end_of_older_messages(&self, end: bool) {
        self.end_of_older_messages.set(end);
    }

    /// Whether newer-message pagination is exhausted (live edge).
    pub fn end_of_newer_messages(&self) -> bool {
        self.end_of_newer_messages.get()
    }

    /// Set the newer-pagination boundary flag.
    pub fn set_end_of_newer_messages(&self, end: bool) {
        self.end_of_newer_messages.set(end);
    }
}
