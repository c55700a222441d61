//! Message routing between channel and thread containers.
//!
//! A message can live in a channel's flat list, in its parent thread's
//! reply list, or in both. These helpers are the one place that routing
//! decision is made; every listener and the event handler go through them.

use palaver_core::Message;
use palaver_state::StateRegistry;

/// Whether the channel container should hold this message: top-level
/// messages always, thread replies only when flagged for the channel view
/// or already present there.
fn belongs_in_channel(registry: &StateRegistry, message: &Message) -> bool {
    message.parent_id.is_none()
        || message.show_in_channel
        || registry
            .active_channel(&message.cid)
            .is_some_and(|channel| channel.contains_message(&message.id))
}

/// Upsert a message into the containers it belongs to, creating them on
/// demand. Used on the user-action path, where the acting user is looking
/// at the channel or thread in question.
pub(crate) fn upsert_creating(registry: &StateRegistry, message: &Message) {
    if belongs_in_channel(registry, message) {
        registry.channel_by_cid(&message.cid).upsert_message(message.clone());
    }
    if let Some(parent_id) = &message.parent_id {
        registry.thread(parent_id).upsert_message(message.clone());
    }
}

/// Upsert a message into already-tracked containers only. Used on the
/// server-event path, where events for channels and threads this session
/// never opened are a no-op.
pub(crate) fn upsert_tracked(registry: &StateRegistry, message: &Message) {
    if belongs_in_channel(registry, message) {
        if let Some(channel) = registry.active_channel(&message.cid) {
            channel.upsert_message(message.clone());
        }
    }
    if let Some(parent_id) = &message.parent_id
        && let Some(thread) = registry.active_thread(parent_id)
    {
        thread.upsert_message(message.clone());
    }
}

/// Remove a message from every container that holds it.
pub(crate) fn remove_everywhere(registry: &StateRegistry, message: &Message) {
    if let Some(channel) = registry.active_channel(&message.cid) {
        channel.delete_message(&message.id);
    }
    if let Some(parent_id) = &message.parent_id
        && let Some(thread) = registry.active_thread(parent_id)
    {
        thread.delete_message(&message.id);
    }
}

/// Mutate the stored copies of a message in every container that holds
/// it. Returns whether any container did.
pub(crate) fn update_everywhere(
    registry: &StateRegistry,
    message: &Message,
    mutate: impl Fn(&mut Message),
) -> bool {
    let mut found = false;
    if let Some(channel) = registry.active_channel(&message.cid) {
        found |= channel.update_message(&message.id, &mutate);
    }
    if let Some(parent_id) = &message.parent_id
        && let Some(thread) = registry.active_thread(parent_id)
    {
        found |= thread.update_message(&message.id, &mutate);
    }
    found
}

/// Write a reconciled message back into its containers. Reconciliation
/// replaces the stored copy outright (the result phase already holds the
/// authoritative version, and a status-only change may not move the
/// version stamps), inserting when no container holds the message yet.
pub(crate) fn apply_reconciled(registry: &StateRegistry, message: &Message) {
    let replaced = update_everywhere(registry, message, |stored| *stored = message.clone());
    if !replaced {
        upsert_creating(registry, message);
    }
}

/// Current stored copy of a message, preferring the channel container and
/// falling back to its thread.
pub(crate) fn find_message(
    registry: &StateRegistry,
    message: &Message,
) -> Option<Message> {
    registry
        .active_channel(&message.cid)
        .and_then(|channel| channel.message(&message.id))
        .or_else(|| {
            message
                .parent_id
                .as_ref()
                .and_then(|parent_id| registry.active_thread(parent_id))
                .and_then(|thread| thread.message(&message.id))
        })
}
