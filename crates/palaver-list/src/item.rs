//! Typed list items the projection emits.

use chrono::{DateTime, Utc};
use palaver_core::{Message, User};

use crate::position::GroupPosition;

/// One entry of the projected message list.
///
/// Regenerated wholesale on every relevant input change, never mutated in
/// place.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageListItem {
    /// A renderable chat message with its display annotations.
    Message(MessageItem),
    /// Calendar boundary between two messages.
    DateSeparator(DateTime<Utc>),
    /// Boundary between a thread's root message and its replies.
    ThreadDateSeparator(DateTime<Utc>),
    /// Server-generated notice rendered without a sender bubble.
    System(Message),
    /// Users currently typing; always the last item when present.
    TypingIndicator(Vec<User>),
    /// Marks where the current user stopped reading.
    UnreadSeparator {
        /// Number of unread messages below the separator.
        unread_count: u32,
    },
    /// Older-message pagination is exhausted; the channel starts here.
    StartOfChannel,
    /// Thread with no replies yet.
    EmptyThreadPlaceholder,
}

/// A message plus the annotations the projection derived for it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageItem {
    /// The message itself.
    pub message: Message,
    /// Grouping position among consecutive same-sender messages.
    pub position: GroupPosition,
    /// Whether the current user sent it.
    pub is_mine: bool,
    /// Whether at least one other member has read past it.
    pub is_read: bool,
    /// Whether the sender's avatar is shown (last message of its group).
    pub show_avatar: bool,
    /// Whether this message is the current scroll-to focus target.
    pub is_focused: bool,
}
