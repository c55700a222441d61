//! Per-session registry of state containers.

use std::sync::Arc;

use dashmap::DashMap;
use palaver_core::{ChatEvent, Cid};

use crate::{
    channel_state::ChannelMutableState, query_state::QueryChannelsMutableState,
    thread_state::ThreadMutableState,
};

/// Keyed cache of mutable state containers for one authenticated session.
///
/// Get-or-create accessors are race-safe: concurrent event delivery and UI
/// reads resolving the same key observe a single container instance. The
/// registry is constructed at sign-in and [`clear`](Self::clear)ed at
/// sign-out; containers an in-flight operation still holds after a clear
/// are orphaned, so their writes are invisible to any reader.
#[derive(Debug, Default)]
pub struct StateRegistry {
    channels: DashMap<Cid, Arc<ChannelMutableState>>,
    threads: DashMap<String, Arc<ThreadMutableState>>,
    queries: DashMap<String, Arc<QueryChannelsMutableState>>,
}

impl StateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Container for a channel, created on first access.
    pub fn channel(&self, channel_type: &str, channel_id: &str) -> Arc<ChannelMutableState> {
        self.channel_by_cid(&Cid::new(channel_type, channel_id))
    }

    /// Container for a channel by cid, created on first access.
    pub fn channel_by_cid(&self, cid: &Cid) -> Arc<ChannelMutableState> {
        self.channels
            .entry(cid.clone())
            .or_insert_with(|| Arc::new(ChannelMutableState::new(cid.clone())))
            .clone()
    }

    /// Container for a channel only if one is already tracked.
    pub fn active_channel(&self, cid: &Cid) -> Option<Arc<ChannelMutableState>> {
        self.channels.get(cid).map(|entry| entry.clone())
    }

    /// Container for a thread, created on first access.
    pub fn thread(&self, parent_message_id: &str) -> Arc<ThreadMutableState> {
        self.threads
            .entry(parent_message_id.to_string())
            .or_insert_with(|| Arc::new(ThreadMutableState::new(parent_message_id)))
            .clone()
    }

    /// Container for a thread only if one is already tracked.
    pub fn active_thread(&self, parent_message_id: &str) -> Option<Arc<ThreadMutableState>> {
        self.threads.get(parent_message_id).map(|entry| entry.clone())
    }

    /// Container for a channel query, created on first access.
    pub fn query(&self, query_key: &str) -> Arc<QueryChannelsMutableState> {
        self.queries
            .entry(query_key.to_string())
            .or_insert_with(|| Arc::new(QueryChannelsMutableState::new(query_key)))
            .clone()
    }

    /// All tracked channel containers.
    pub fn channels(&self) -> Vec<Arc<ChannelMutableState>> {
        self.channels.iter().map(|entry| entry.value().clone()).collect()
    }

    /// All tracked thread containers.
    pub fn threads(&self) -> Vec<Arc<ThreadMutableState>> {
        self.threads.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Drop one channel container and its entry in every query list.
    pub fn remove_channel(&self, cid: &Cid) {
        if self.channels.remove(cid).is_some() {
            tracing::debug!(%cid, "dropped channel container");
        }
        for entry in &self.queries {
            entry.value().remove_channel(cid);
        }
    }

    /// Apply the container-lifecycle part of an event batch: deletion
    /// events drop channel containers in batch order. Re-deleting an
    /// already removed channel is a no-op.
    pub fn handle_batch_event(&self, batch: &[ChatEvent]) {
        for event in batch {
            if let ChatEvent::ChannelDeleted { cid } = event {
                self.remove_channel(cid);
            }
        }
    }

    /// Empty every map. Idempotent; safe to call repeatedly.
    pub fn clear(&self) {
        self.channels.clear();
        self.threads.clear();
        self.queries.clear();
    }
}
