//! Per-query channel-list container.

use palaver_core::{Channel, Cid};
use tokio::sync::watch;

use crate::observable::Observable;

/// Observable result list of one channel query (e.g. "my channels sorted
/// by last message").
///
/// Holds ordered channel summaries; message-level state lives in the
/// per-channel containers. Channel-deleted events remove entries here as
/// well as the channel container itself.
#[derive(Debug)]
pub struct QueryChannelsMutableState {
    query_key: String,
    channels: Observable<Vec<Channel>>,
    loading: Observable<bool>,
}

impl QueryChannelsMutableState {
    /// Create empty state for the query identified by `query_key`.
    pub fn new(query_key: impl Into<String>) -> Self {
        Self {
            query_key: query_key.into(),
            channels: Observable::default(),
            loading: Observable::new(false),
        }
    }

    /// Identity of the query this list belongs to.
    pub fn query_key(&self) -> &str {
        &self.query_key
    }

    /// Replace the whole result list (fresh query response).
    pub fn set_channels(&self, channels: Vec<Channel>) {
        self.channels.set(channels);
    }

    /// Insert or replace one channel, preserving list order for an
    /// existing entry and appending a new one.
    pub fn upsert_channel(&self, channel: Channel) {
        self.channels.update(|channels| {
            match channels.iter_mut().find(|c| c.cid == channel.cid) {
                Some(existing) => *existing = channel,
                None => channels.push(channel),
            }
        });
    }

    /// Remove one channel from the result list.
    pub fn remove_channel(&self, cid: &Cid) {
        self.channels.update(|channels| channels.retain(|c| &c.cid != cid));
    }

    /// Current result list.
    pub fn channels(&self) -> Vec<Channel> {
        self.channels.get()
    }

    /// Subscribe to result-list changes.
    pub fn subscribe_channels(&self) -> watch::Receiver<Vec<Channel>> {
        self.channels.subscribe()
    }

    /// Whether the query is currently being (re)loaded.
    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    /// Set the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(id: &str) -> Channel {
        Channel { cid: Cid::new("messaging", id), ..Channel::default() }
    }

    #[test]
    fn upsert_appends_new_and_replaces_existing_in_place() {
        let state = QueryChannelsMutableState::new("all");
        state.set_channels(vec![channel("a"), channel("b")]);

        let mut updated = channel("a");
        updated.name = "renamed".into();
        state.upsert_channel(updated);
        state.upsert_channel(channel("c"));

        let names: Vec<String> =
            state.channels().into_iter().map(|c| c.cid.channel_id).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(state.channels()[0].name, "renamed");
    }

    #[test]
    fn remove_drops_entry() {
        let state = QueryChannelsMutableState::new("all");
        state.set_channels(vec![channel("a"), channel("b")]);
        state.remove_channel(&Cid::new("messaging", "a"));

        assert_eq!(state.channels().len(), 1);
    }
}
