//! Message and reaction models, including the "newest wins" version order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{channel::Cid, user::User};

/// Synchronization lifecycle of a locally mutated entity.
///
/// Set at request time, finalized at result time, and swept by the
/// background sync pass while `SyncNeeded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// The network call is in flight.
    InProgress,
    /// The mutation happened offline or failed transiently; a later sync
    /// pass will retry it.
    SyncNeeded,
    /// The server confirmed the mutation.
    #[default]
    Completed,
    /// The server rejected the mutation permanently; never retried.
    FailedPermanently,
}

/// Message kind, driving projection routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    /// Ordinary user message.
    #[default]
    Regular,
    /// Server-generated notice (member added, channel updated, ...).
    System,
    /// Client- or moderation-generated error notice.
    Error,
    /// Transient message only the sender sees (e.g. a giphy preview).
    Ephemeral,
}

/// A file or link attached to a message. Only identity and location; any
/// rendering metadata stays behind the UI boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment kind (`image`, `file`, `giphy`, ...).
    pub kind: String,
    /// Where the payload lives.
    pub url: String,
}

/// One user's reaction on a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Message the reaction belongs to.
    pub message_id: String,
    /// Reacting user.
    pub user_id: String,
    /// Reaction kind (`like`, `wow`, ...).
    pub kind: String,
    /// Reaction weight; 1 unless the product uses cumulative reactions.
    pub score: u32,
    /// Synchronization lifecycle of this reaction.
    pub sync_status: SyncStatus,
    /// Server creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Local deletion time, set while an optimistic delete is unconfirmed.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Aggregated per-kind reaction counters on a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionGroup {
    /// Number of reactions of this kind.
    pub count: u32,
    /// Sum of the scores of this kind.
    pub sum_scores: u32,
}

/// A chat message.
///
/// The same message value may live in a channel container and in its parent
/// thread's container at once; the listener protocol keeps the two copies
/// consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id. Generated locally (UUID v4) for optimistic sends
    /// and kept when the server confirms.
    pub id: String,
    /// Channel the message belongs to.
    pub cid: Cid,
    /// Thread root message id; `None` for top-level messages.
    pub parent_id: Option<String>,
    /// Whether a thread reply is also shown in the channel's flat list.
    pub show_in_channel: bool,
    /// Message text.
    pub text: String,
    /// Attached files/links.
    pub attachments: Vec<Attachment>,
    /// Sending user.
    pub user: User,
    /// Message kind.
    pub message_type: MessageType,
    /// Synchronization lifecycle.
    pub sync_status: SyncStatus,
    /// Current user's reactions on this message.
    pub own_reactions: Vec<Reaction>,
    /// Most recent reactions from all users.
    pub latest_reactions: Vec<Reaction>,
    /// Per-kind aggregated reaction counters.
    pub reaction_groups: HashMap<String, ReactionGroup>,
    /// Server creation time. Present once the server confirmed the send.
    pub created_at: Option<DateTime<Utc>>,
    /// Local creation time for a not-yet-confirmed send.
    pub created_locally_at: Option<DateTime<Utc>>,
    /// Server update time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Local update time for a not-yet-confirmed edit.
    pub updated_locally_at: Option<DateTime<Utc>>,
    /// Deletion time (server or local, whichever happened).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Creation time used for display ordering: server time wins once
    /// present, otherwise the local stamp, otherwise the epoch.
    pub fn effective_created_at(&self) -> DateTime<Utc> {
        self.created_at.or(self.created_locally_at).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Newest server-side stamp: `max(created_at, updated_at, deleted_at)`.
    pub fn server_version_stamp(&self) -> Option<DateTime<Utc>> {
        [self.created_at, self.updated_at, self.deleted_at].into_iter().flatten().max()
    }

    /// Newest local stamp:
    /// `max(created_locally_at, updated_locally_at, deleted_at)`.
    pub fn local_version_stamp(&self) -> Option<DateTime<Utc>> {
        [self.created_locally_at, self.updated_locally_at, self.deleted_at]
            .into_iter()
            .flatten()
            .max()
    }

    /// Strict "newest wins" comparison against a stored copy of the same
    /// message. The incoming (`self`) sync status selects which clock is
    /// compared on both sides: a `Completed` message compares server
    /// stamps, anything else compares local stamps.
    ///
    /// Note the two clocks are the device's and the server's, with no skew
    /// correction; under heavy client clock drift an edit can compare as
    /// older than it is. Known limitation, kept as specified.
    pub fn is_newer_than(&self, stored: &Self) -> bool {
        let (incoming, existing) = if self.sync_status == SyncStatus::Completed {
            (self.server_version_stamp(), stored.server_version_stamp())
        } else {
            (self.local_version_stamp(), stored.local_version_stamp())
        };
        match (incoming, existing) {
            (Some(a), Some(b)) => a > b,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Stamp a server-assigned channel on a locally created message.
    pub fn enrich_with_cid(&mut self, cid: &Cid) {
        self.cid = cid.clone();
    }

    /// True for the transient message kind only the sender sees.
    pub fn is_ephemeral(&self) -> bool {
        self.message_type == MessageType::Ephemeral
    }

    /// Insert or replace a reaction on this message.
    ///
    /// With `enforce_unique` the reacting user's previous reactions on the
    /// message are removed first, so at most one survives. `is_mine`
    /// controls whether `own_reactions` mirrors the change. Aggregated
    /// counters follow both the removals and the insert.
    pub fn upsert_reaction(&mut self, reaction: Reaction, enforce_unique: bool, is_mine: bool) {
        if enforce_unique {
            self.drop_user_reactions(&reaction.user_id);
        } else {
            // Re-sending the same kind replaces, never duplicates.
            self.drop_reaction(&reaction.user_id, &reaction.kind);
        }
        let group = self.reaction_groups.entry(reaction.kind.clone()).or_default();
        group.count += 1;
        group.sum_scores += reaction.score;
        if is_mine {
            self.own_reactions.push(reaction.clone());
        }
        self.latest_reactions.push(reaction);
    }

    /// Remove one user's reaction of one kind, adjusting counters.
    pub fn remove_reaction(&mut self, user_id: &str, kind: &str) {
        self.drop_reaction(user_id, kind);
    }

    fn drop_user_reactions(&mut self, user_id: &str) {
        let removed: Vec<Reaction> =
            self.latest_reactions.iter().filter(|r| r.user_id == user_id).cloned().collect();
        for reaction in &removed {
            self.decrement_group(&reaction.kind, reaction.score);
        }
        self.latest_reactions.retain(|r| r.user_id != user_id);
        self.own_reactions.retain(|r| r.user_id != user_id);
    }

    fn drop_reaction(&mut self, user_id: &str, kind: &str) {
        let removed: Vec<Reaction> = self
            .latest_reactions
            .iter()
            .filter(|r| r.user_id == user_id && r.kind == kind)
            .cloned()
            .collect();
        for reaction in &removed {
            self.decrement_group(&reaction.kind, reaction.score);
        }
        self.latest_reactions.retain(|r| !(r.user_id == user_id && r.kind == kind));
        self.own_reactions.retain(|r| !(r.user_id == user_id && r.kind == kind));
    }

    fn decrement_group(&mut self, kind: &str, score: u32) {
        if let Some(group) = self.reaction_groups.get_mut(kind) {
            group.count = group.count.saturating_sub(1);
            group.sum_scores = group.sum_scores.saturating_sub(score);
            if group.count == 0 {
                self.reaction_groups.remove(kind);
            }
        }
    }
}
