//! Abstract network client boundary.

use async_trait::async_trait;

use crate::{
    channel::Cid,
    error::ChatResult,
    message::{Message, Reaction},
};

/// Async commands the synchronization core issues against the server.
///
/// Transport, serialization, and authentication live behind this trait; the
/// core only sees [`ChatResult`] values and classifies their errors. All
/// methods take `&self` so one client instance can serve concurrent
/// operations.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a new message. The returned copy carries server-assigned
    /// fields (cid, `created_at`).
    async fn send_message(&self, message: &Message) -> ChatResult<Message>;

    /// Edit an existing message.
    async fn update_message(&self, message: &Message) -> ChatResult<Message>;

    /// Delete a message. `hard` removes it entirely instead of
    /// tombstoning.
    async fn delete_message(&self, message_id: &str, hard: bool) -> ChatResult<Message>;

    /// Add a reaction. With `enforce_unique` the server replaces the
    /// user's previous reaction on the message.
    async fn send_reaction(&self, reaction: &Reaction, enforce_unique: bool)
    -> ChatResult<Reaction>;

    /// Remove a reaction by message id and kind, returning the updated
    /// message.
    async fn delete_reaction(&self, message_id: &str, kind: &str) -> ChatResult<Message>;

    /// Mark the whole channel read for the current user.
    async fn mark_read(&self, cid: &Cid) -> ChatResult<()>;

    /// Notify other members the current user started typing.
    async fn start_typing(&self, cid: &Cid, parent_id: Option<&str>) -> ChatResult<()>;

    /// Notify other members the current user stopped typing.
    async fn stop_typing(&self, cid: &Cid) -> ChatResult<()>;

    /// Commit an ephemeral giphy preview as a regular message.
    async fn send_giphy(&self, message: &Message) -> ChatResult<Message>;

    /// Ask for another giphy candidate for an ephemeral preview.
    async fn shuffle_giphy(&self, message: &Message) -> ChatResult<Message>;
}
