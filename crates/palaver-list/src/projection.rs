//! Pure projection from container snapshots to the rendered item list.

use palaver_core::{ChannelUserRead, Message, MessageType, User};

use crate::{
    date_separator::DateSeparatorPolicy,
    item::{MessageItem, MessageListItem},
    position::{GroupPosition, MessagePositionHandler},
};

/// Who may still see a deleted (tombstoned) message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletedMessageVisibility {
    /// Everyone sees the tombstone.
    #[default]
    Always,
    /// Only the sender sees the tombstone.
    OnlyMine,
    /// Tombstones are hidden entirely.
    Never,
}

/// Whether the list renders a channel's flat history or one thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Channel history; the first entry may be a start-of-channel marker.
    #[default]
    Channel,
    /// Thread view: the root message followed by its replies.
    Thread,
}

/// Visibility configuration of one projection.
#[derive(Debug, Clone, Default)]
pub struct ProjectionConfig {
    /// Tombstone visibility.
    pub deleted_visibility: DeletedMessageVisibility,
    /// Thread mode: show a placeholder when the thread has no replies.
    pub show_empty_thread_placeholder: bool,
}

/// Everything [`project`] reads. All inputs are explicit; the projection
/// itself never consults a clock or any other ambient state.
#[derive(Debug, Clone, Default)]
pub struct ProjectionInput {
    /// Channel or thread rendering.
    pub mode: ListMode,
    /// Messages pre-sorted ascending by effective creation time.
    pub messages: Vec<Message>,
    /// Read markers of every channel member.
    pub reads: Vec<ChannelUserRead>,
    /// Users currently typing, in deterministic order.
    pub typing_users: Vec<User>,
    /// The viewing user.
    pub current_user_id: String,
    /// Scroll-to focus target, if any.
    pub focused_message_id: Option<String>,
    /// Newest message the current user has read, for the unread separator.
    pub last_read_message_id: Option<String>,
    /// Unread count shown on the unread separator.
    pub unread_count: u32,
    /// Whether older-message pagination is exhausted.
    pub start_of_channel: bool,
    /// Visibility configuration.
    pub config: ProjectionConfig,
}

/// Project container snapshots into the ordered item list.
///
/// Single forward pass: start-of-channel marker, then per message a date
/// separator when the policy asks for one, the message itself as a system
/// or message item, and the unread separator after the last-read message;
/// thread mode swaps in its own separator before the first reply; a
/// typing indicator closes the list. Deterministic for identical inputs.
pub fn project(
    input: &ProjectionInput,
    positions: &dyn MessagePositionHandler,
    dates: &dyn DateSeparatorPolicy,
) -> Vec<MessageListItem> {
    let visible: Vec<&Message> = input.messages.iter().filter(|m| is_visible(m, input)).collect();

    // Separator flags double as group breaks for position computation.
    let separated: Vec<bool> = visible
        .iter()
        .enumerate()
        .map(|(i, message)| match input.mode {
            ListMode::Channel => {
                dates.separates(i.checked_sub(1).map(|p| visible[p]), message)
            },
            ListMode::Thread => i == 1,
        })
        .collect();

    let mut items = Vec::with_capacity(visible.len() + 4);
    if input.mode == ListMode::Channel && input.start_of_channel {
        items.push(MessageListItem::StartOfChannel);
    }

    for (i, message) in visible.iter().enumerate() {
        if separated[i] {
            let stamp = message.effective_created_at();
            items.push(match input.mode {
                ListMode::Channel => MessageListItem::DateSeparator(stamp),
                ListMode::Thread => MessageListItem::ThreadDateSeparator(stamp),
            });
        }

        if is_system(message) {
            items.push(MessageListItem::System((*message).clone()));
        } else {
            let position = positions.position(
                i.checked_sub(1).map(|p| visible[p]),
                message,
                visible.get(i + 1).copied(),
                separated[i],
                separated.get(i + 1).copied().unwrap_or(false),
            );
            items.push(MessageListItem::Message(annotate(message, position, input)));
        }

        let is_last_read = input.last_read_message_id.as_deref() == Some(message.id.as_str());
        if is_last_read && i + 1 < visible.len() {
            items.push(MessageListItem::UnreadSeparator { unread_count: input.unread_count });
        }
    }

    if input.mode == ListMode::Thread
        && visible.len() <= 1
        && input.config.show_empty_thread_placeholder
    {
        items.push(MessageListItem::EmptyThreadPlaceholder);
    }

    if !input.typing_users.is_empty() {
        items.push(MessageListItem::TypingIndicator(input.typing_users.clone()));
    }

    items
}

fn is_visible(message: &Message, input: &ProjectionInput) -> bool {
    let mine = message.user.id == input.current_user_id;
    if message.deleted_at.is_some() {
        return match input.config.deleted_visibility {
            DeletedMessageVisibility::Always => true,
            DeletedMessageVisibility::OnlyMine => mine,
            DeletedMessageVisibility::Never => false,
        };
    }
    // Ephemeral previews exist only for their sender.
    if message.is_ephemeral() {
        return mine;
    }
    true
}

fn is_system(message: &Message) -> bool {
    matches!(message.message_type, MessageType::System | MessageType::Error)
}

fn annotate(message: &Message, position: GroupPosition, input: &ProjectionInput) -> MessageItem {
    let created = message.effective_created_at();
    let is_read = input.reads.iter().any(|read| {
        read.user.id != input.current_user_id
            && read.user.joined_at.is_none_or(|joined| joined <= created)
            && read.last_read.is_some_and(|last| created <= last)
    });
    MessageItem {
        message: message.clone(),
        position,
        is_mine: message.user.id == input.current_user_id,
        is_read,
        show_avatar: matches!(position, GroupPosition::Bottom | GroupPosition::None),
        is_focused: input.focused_message_id.as_deref() == Some(message.id.as_str()),
    }
}
