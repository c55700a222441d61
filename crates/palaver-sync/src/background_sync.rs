//! Replay of mutations left pending by offline or transiently failed
//! operations.

use std::collections::HashSet;

use palaver_core::{Message, Reaction, SyncStatus};

use crate::coordinator::OperationCoordinator;

impl OperationCoordinator {
    /// Replay every message and own reaction left `SyncNeeded`, typically
    /// after the connection recovers.
    ///
    /// Each pending entity goes back through its operation's network call
    /// and result reconciliation, so a replay that fails transiently stays
    /// `SyncNeeded` for the next pass and one that fails permanently
    /// settles in `FailedPermanently`. Entities already
    /// `FailedPermanently` are never picked up again.
    pub async fn sync_pending(&self) {
        let pending = self.collect_pending();
        if pending.is_empty() {
            return;
        }
        tracing::debug!(count = pending.len(), "replaying pending mutations");

        for message in pending {
            if message.sync_status == SyncStatus::SyncNeeded {
                self.replay_message(&message).await;
            }
            for reaction in &message.own_reactions {
                if reaction.sync_status == SyncStatus::SyncNeeded {
                    self.replay_reaction(&message, reaction).await;
                }
            }
        }
    }

    /// Messages that need a replay themselves or carry a pending own
    /// reaction. A message mirrored into a thread container is collected
    /// once.
    fn collect_pending(&self) -> Vec<Message> {
        let registry = &self.context().registry;
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        let mut collect = |message: Message| {
            let message_pending = message.sync_status == SyncStatus::SyncNeeded
                || message
                    .own_reactions
                    .iter()
                    .any(|r| r.sync_status == SyncStatus::SyncNeeded);
            if message_pending && seen.insert(message.id.clone()) {
                pending.push(message);
            }
        };

        for channel in registry.channels() {
            for message in channel.all_messages() {
                collect(message);
            }
        }
        for thread in registry.threads() {
            for message in thread.all_messages() {
                collect(message);
            }
        }
        pending
    }

    async fn replay_message(&self, message: &Message) {
        if message.deleted_at.is_some() {
            let result = self.api().delete_message(&message.id, false).await;
            self.delete_message_listener().on_result(message, &result);
        } else if message.created_at.is_none() {
            let result = self.api().send_message(message).await;
            self.send_message_listener().on_result(message, &result);
        } else {
            let result = self.api().update_message(message).await;
            self.edit_message_listener().on_result(message, &result);
        }
    }

    async fn replay_reaction(&self, message: &Message, reaction: &Reaction) {
        if reaction.deleted_at.is_some() {
            let result = self.api().delete_reaction(&message.id, &reaction.kind).await;
            self.delete_reaction_listener().on_result(message, &reaction.kind, &result);
        } else {
            let result = self.api().send_reaction(reaction, false).await;
            self.send_reaction_listener().on_result(message, reaction, &result);
        }
    }
}
