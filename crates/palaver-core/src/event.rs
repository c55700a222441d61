//! Server-pushed domain events.
//!
//! Each variant carries enough identity (cid, message id) for the event
//! handler to route it to the matching state container. Events the client
//! does not understand arrive as [`ChatEvent::Unknown`] and are skipped
//! without aborting the batch they came in.

use chrono::{DateTime, Utc};

use crate::{channel::Cid, message::Message, message::Reaction, user::User};

/// A server-pushed event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A message was posted to a channel.
    NewMessage {
        /// Target channel.
        cid: Cid,
        /// The posted message.
        message: Message,
    },

    /// A message was edited.
    MessageUpdated {
        /// The updated message, already carrying its cid.
        message: Message,
    },

    /// A message was deleted.
    MessageDeleted {
        /// The deleted message with `deleted_at` set.
        message: Message,
        /// Hard deletions remove the entry instead of tombstoning it.
        hard: bool,
    },

    /// A reaction was added.
    ReactionNew {
        /// The message with server-updated reaction lists.
        message: Message,
        /// The added reaction.
        reaction: Reaction,
    },

    /// A reaction was removed.
    ReactionDeleted {
        /// The message with server-updated reaction lists.
        message: Message,
        /// The removed reaction.
        reaction: Reaction,
    },

    /// A user read a channel.
    MessageRead {
        /// Target channel.
        cid: Cid,
        /// The reading user.
        user: User,
        /// When the read happened.
        created_at: DateTime<Utc>,
        /// Newest message covered by the read, when the server knows it.
        last_read_message_id: Option<String>,
    },

    /// A user started typing.
    TypingStart {
        /// Target channel.
        cid: Cid,
        /// The typing user.
        user: User,
        /// Thread root when typing inside a thread.
        parent_id: Option<String>,
    },

    /// A user stopped typing.
    TypingStop {
        /// Target channel.
        cid: Cid,
        /// The user that stopped.
        user: User,
    },

    /// A channel was deleted; its container must be dropped.
    ChannelDeleted {
        /// The deleted channel.
        cid: Cid,
    },

    /// A channel's history was truncated.
    ChannelTruncated {
        /// Target channel.
        cid: Cid,
        /// Messages at or before this time are gone. `None` clears all.
        truncated_at: Option<DateTime<Utc>>,
    },

    /// An event kind this client version does not understand.
    Unknown {
        /// Raw event kind string, for diagnostics.
        kind: String,
    },
}

impl ChatEvent {
    /// Channel identity of the event, when it has one.
    pub fn cid(&self) -> Option<&Cid> {
        match self {
            Self::NewMessage { cid, .. }
            | Self::MessageRead { cid, .. }
            | Self::TypingStart { cid, .. }
            | Self::TypingStop { cid, .. }
            | Self::ChannelDeleted { cid }
            | Self::ChannelTruncated { cid, .. } => Some(cid),
            Self::MessageUpdated { message }
            | Self::MessageDeleted { message, .. }
            | Self::ReactionNew { message, .. }
            | Self::ReactionDeleted { message, .. } => Some(&message.cid),
            Self::Unknown { .. } => None,
        }
    }
}
