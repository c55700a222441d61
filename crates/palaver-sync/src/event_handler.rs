//! Applies server-pushed event batches to the state registry.

use std::sync::Arc;

use palaver_core::{ChannelUserRead, ChatError, ChatEvent, ChatResult, SyncStatus};
use palaver_state::{SessionState, StateRegistry};

use crate::containers;

/// Routes [`ChatEvent`] batches into the matching state containers.
///
/// Events are applied in arrival order. A malformed or unroutable event is
/// logged and skipped; it never aborts the rest of its batch. Events for
/// channels and threads this session never opened are silent no-ops.
pub struct EventHandler {
    registry: Arc<StateRegistry>,
    session: Arc<SessionState>,
}

impl EventHandler {
    /// Handler writing into `registry` on behalf of `session`.
    pub fn new(registry: Arc<StateRegistry>, session: Arc<SessionState>) -> Self {
        Self { registry, session }
    }

    /// Apply a batch of events in order.
    pub fn handle_events(&self, batch: &[ChatEvent]) {
        // Container lifecycle first: a deleted channel must be gone before
        // later events in the same batch could resurrect it.
        self.registry.handle_batch_event(batch);

        for event in batch {
            if let Err(error) = self.apply(event) {
                tracing::warn!(?event, %error, "skipping event");
            }
        }
    }

    fn apply(&self, event: &ChatEvent) -> ChatResult<()> {
        match event {
            ChatEvent::NewMessage { message, .. } | ChatEvent::MessageUpdated { message } => {
                if message.id.is_empty() {
                    return Err(ChatError::validation("event message has no id"));
                }
                let mut message = message.clone();
                message.sync_status = SyncStatus::Completed;
                containers::upsert_tracked(&self.registry, &message);
            }
            ChatEvent::MessageDeleted { message, hard } => {
                if *hard {
                    containers::remove_everywhere(&self.registry, message);
                } else {
                    let mut tombstone = message.clone();
                    tombstone.sync_status = SyncStatus::Completed;
                    containers::upsert_tracked(&self.registry, &tombstone);
                }
            }
            ChatEvent::ReactionNew { message, .. }
            | ChatEvent::ReactionDeleted { message, .. } => {
                // The message carries the server's full reaction state;
                // replace the stored lists instead of re-deriving them.
                containers::update_everywhere(&self.registry, message, |stored| {
                    stored.own_reactions = message.own_reactions.clone();
                    stored.latest_reactions = message.latest_reactions.clone();
                    stored.reaction_groups = message.reaction_groups.clone();
                });
            }
            ChatEvent::MessageRead { cid, user, created_at, last_read_message_id } => {
                if let Some(channel) = self.registry.active_channel(cid) {
                    channel.upsert_read(ChannelUserRead {
                        user: user.clone(),
                        last_read: Some(*created_at),
                        last_read_message_id: last_read_message_id.clone(),
                        unread_messages: 0,
                    });
                }
            }
            ChatEvent::TypingStart { cid, user, .. } => {
                let is_own = self
                    .session
                    .current_user()
                    .is_some_and(|current| current.id == user.id);
                if !is_own && let Some(channel) = self.registry.active_channel(cid) {
                    channel.set_typing(user.clone());
                }
            }
            ChatEvent::TypingStop { cid, user } => {
                if let Some(channel) = self.registry.active_channel(cid) {
                    channel.clear_typing(&user.id);
                }
            }
            ChatEvent::ChannelDeleted { .. } => {
                // Container teardown already happened in the batch pass.
            }
            ChatEvent::ChannelTruncated { cid, truncated_at } => {
                if let Some(channel) = self.registry.active_channel(cid) {
                    channel.truncate(*truncated_at);
                }
            }
            ChatEvent::Unknown { kind } => {
                return Err(ChatError::Generic(format!("unknown event kind {kind}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use palaver_core::{Cid, Message, User};
    use palaver_state::ConnectionState;

    use super::*;

    fn handler() -> (EventHandler, Arc<StateRegistry>) {
        let registry = Arc::new(StateRegistry::new());
        let session = Arc::new(SessionState::new());
        session.set_current_user(Some(User::new("me")));
        session.set_connection(ConnectionState::Connected);
        (EventHandler::new(registry.clone(), session), registry)
    }

    fn incoming(id: &str) -> Message {
        Message {
            id: id.into(),
            cid: Cid::new("messaging", "general"),
            text: "hi".into(),
            user: User::new("other"),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()),
            ..Message::default()
        }
    }

    #[test]
    fn new_message_lands_in_tracked_channel_as_completed() {
        let (handler, registry) = handler();
        let channel = registry.channel("messaging", "general");

        let message = incoming("m1");
        handler.handle_events(&[ChatEvent::NewMessage {
            cid: message.cid.clone(),
            message,
        }]);

        let stored = channel.message("m1").unwrap();
        assert_eq!(stored.sync_status, SyncStatus::Completed);
    }

    #[test]
    fn events_for_untracked_channels_are_no_ops() {
        let (handler, registry) = handler();
        let message = incoming("m1");
        handler.handle_events(&[ChatEvent::NewMessage {
            cid: message.cid.clone(),
            message: message.clone(),
        }]);

        assert!(registry.active_channel(&message.cid).is_none());
    }

    #[test]
    fn malformed_event_does_not_abort_the_batch() {
        let (handler, registry) = handler();
        let channel = registry.channel("messaging", "general");

        let bad = incoming("");
        let good = incoming("m2");
        handler.handle_events(&[
            ChatEvent::NewMessage { cid: bad.cid.clone(), message: bad },
            ChatEvent::Unknown { kind: "channel.frobnicated".into() },
            ChatEvent::NewMessage { cid: good.cid.clone(), message: good },
        ]);

        assert!(!channel.contains_message(""));
        assert!(channel.contains_message("m2"));
    }

    #[test]
    fn hard_delete_removes_soft_delete_tombstones() {
        let (handler, registry) = handler();
        let channel = registry.channel("messaging", "general");
        channel.upsert_message(incoming("m1"));
        channel.upsert_message(incoming("m2"));

        let mut soft = incoming("m1");
        soft.deleted_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
        soft.updated_at = soft.deleted_at;
        handler.handle_events(&[
            ChatEvent::MessageDeleted { message: soft, hard: false },
            ChatEvent::MessageDeleted { message: incoming("m2"), hard: true },
        ]);

        assert!(channel.message("m1").unwrap().deleted_at.is_some());
        assert!(!channel.contains_message("m2"));
    }

    #[test]
    fn own_typing_start_is_ignored() {
        let (handler, registry) = handler();
        let cid = Cid::new("messaging", "general");
        let channel = registry.channel("messaging", "general");

        handler.handle_events(&[
            ChatEvent::TypingStart { cid: cid.clone(), user: User::new("me"), parent_id: None },
            ChatEvent::TypingStart { cid: cid.clone(), user: User::new("other"), parent_id: None },
        ]);
        assert_eq!(channel.typing_users().len(), 1);

        handler.handle_events(&[ChatEvent::TypingStop { cid, user: User::new("other") }]);
        assert!(channel.typing_users().is_empty());
    }

    #[test]
    fn channel_deleted_drops_the_container_mid_batch() {
        let (handler, registry) = handler();
        let cid = Cid::new("messaging", "general");
        registry.channel("messaging", "general");

        let message = incoming("m1");
        handler.handle_events(&[
            ChatEvent::ChannelDeleted { cid: cid.clone() },
            ChatEvent::NewMessage { cid: cid.clone(), message },
        ]);

        // The batch pass removed the container before the message landed.
        assert!(registry.active_channel(&cid).is_none());
    }

    #[test]
    fn read_event_updates_channel_reads() {
        let (handler, registry) = handler();
        let cid = Cid::new("messaging", "general");
        let channel = registry.channel("messaging", "general");

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        handler.handle_events(&[ChatEvent::MessageRead {
            cid,
            user: User::new("other"),
            created_at: at,
            last_read_message_id: Some("m9".into()),
        }]);

        let read = channel.read("other").unwrap();
        assert_eq!(read.last_read, Some(at));
        assert_eq!(read.last_read_message_id.as_deref(), Some("m9"));
        assert_eq!(read.unread_messages, 0);
    }
}
