//! Operation coordinator: public API of the mutation protocol.

use std::sync::Arc;

use palaver_core::{ChatApi, ChatResult, Cid, Clock, Message, Reaction};
use palaver_state::{SessionState, StateRegistry};

use crate::listener::{
    DeleteMessageListener, DeleteReactionListener, EditMessageListener, GiphyListener,
    ListenerContext, MarkReadListener, SendMessageListener, SendReactionListener, TypingListener,
};

/// Drives every mutating operation through its three phases: precondition
/// check, optimistic request-time mutation, network call, result-time
/// reconciliation.
///
/// Composition is explicit: one listener instance per operation, owned by
/// the coordinator and dispatched by method, no ambient registration. A
/// precondition failure returns before the network call and guarantees no
/// state was touched.
pub struct OperationCoordinator {
    api: Arc<dyn ChatApi>,
    ctx: ListenerContext,
    send_message: SendMessageListener,
    edit_message: EditMessageListener,
    delete_message: DeleteMessageListener,
    send_reaction: SendReactionListener,
    delete_reaction: DeleteReactionListener,
    mark_read: MarkReadListener,
    typing: TypingListener,
    giphy: GiphyListener,
}

impl OperationCoordinator {
    /// Wire the coordinator to a network client and a session's registry
    /// and state.
    pub fn new(
        api: Arc<dyn ChatApi>,
        registry: Arc<StateRegistry>,
        session: Arc<SessionState>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ctx = ListenerContext { registry, session, clock };
        Self {
            api,
            send_message: SendMessageListener::new(ctx.clone()),
            edit_message: EditMessageListener::new(ctx.clone()),
            delete_message: DeleteMessageListener::new(ctx.clone()),
            send_reaction: SendReactionListener::new(ctx.clone()),
            delete_reaction: DeleteReactionListener::new(ctx.clone()),
            mark_read: MarkReadListener::new(ctx.clone()),
            typing: TypingListener::new(ctx.clone()),
            giphy: GiphyListener::new(ctx.clone()),
            ctx,
        }
    }

    /// Send a new message. Returns the server-confirmed copy, or the
    /// error that left the local copy queued or failed.
    pub async fn send_message(&self, mut message: Message) -> ChatResult<Message> {
        self.send_message.precheck(&message)?;
        self.send_message.on_request(&mut message);
        let result = self.api.send_message(&message).await;
        self.send_message.on_result(&message, &result);
        result
    }

    /// Edit an existing message.
    pub async fn edit_message(&self, mut message: Message) -> ChatResult<Message> {
        self.edit_message.precheck(&message)?;
        self.edit_message.on_request(&mut message);
        let result = self.api.update_message(&message).await;
        self.edit_message.on_result(&message, &result);
        result
    }

    /// Delete a message, tombstoning (`hard = false`) or removing it.
    pub async fn delete_message(&self, mut message: Message, hard: bool) -> ChatResult<Message> {
        self.delete_message.precheck(&message)?;
        self.delete_message.on_request(&mut message, hard);
        let result = self.api.delete_message(&message.id, hard).await;
        self.delete_message.on_result(&message, &result);
        result
    }

    /// Add a reaction to `target`. With `enforce_unique` the user's
    /// previous reaction on the message is superseded.
    pub async fn send_reaction(
        &self,
        target: &Message,
        mut reaction: Reaction,
        enforce_unique: bool,
    ) -> ChatResult<Reaction> {
        self.send_reaction.precheck(&reaction)?;
        self.send_reaction.on_request(target, &mut reaction, enforce_unique);
        let result = self.api.send_reaction(&reaction, enforce_unique).await;
        self.send_reaction.on_result(target, &reaction, &result);
        result
    }

    /// Remove the current user's reaction of `kind` from `target`.
    pub async fn delete_reaction(&self, target: &Message, kind: &str) -> ChatResult<Message> {
        self.delete_reaction.precheck(&target.id, kind)?;
        self.delete_reaction.on_request(target, kind);
        let result = self.api.delete_reaction(&target.id, kind).await;
        self.delete_reaction.on_result(target, kind, &result);
        result
    }

    /// Mark the whole channel read for the current user.
    pub async fn mark_read(&self, cid: &Cid) -> ChatResult<()> {
        self.mark_read.precheck(cid)?;
        self.mark_read.on_request(cid);
        let result = self.api.mark_read(cid).await;
        self.mark_read.on_result(cid, &result);
        result
    }

    /// Announce that the current user started typing. Rate-limited: a
    /// second start inside the cooldown window fails its precondition.
    pub async fn start_typing(&self, cid: &Cid, parent_id: Option<&str>) -> ChatResult<()> {
        self.typing.precheck_start(cid)?;
        self.typing.on_start_request(cid);
        let result = self.api.start_typing(cid, parent_id).await;
        self.typing.on_result(cid, &result);
        result
    }

    /// Announce that the current user stopped typing.
    pub async fn stop_typing(&self, cid: &Cid) -> ChatResult<()> {
        self.typing.precheck_stop(cid)?;
        self.typing.on_stop_request(cid);
        let result = self.api.stop_typing(cid).await;
        self.typing.on_result(cid, &result);
        result
    }

    /// Commit an ephemeral giphy preview as a regular message.
    pub async fn send_giphy(&self, message: &Message) -> ChatResult<Message> {
        self.giphy.precheck(message)?;
        let result = self.api.send_giphy(message).await;
        self.giphy.on_send_result(message, &result);
        result
    }

    /// Replace an ephemeral giphy preview with another candidate.
    pub async fn shuffle_giphy(&self, message: &Message) -> ChatResult<Message> {
        self.giphy.precheck(message)?;
        let result = self.api.shuffle_giphy(message).await;
        self.giphy.on_shuffle_result(message, &result);
        result
    }

    pub(crate) fn api(&self) -> &Arc<dyn ChatApi> {
        &self.api
    }

    pub(crate) fn context(&self) -> &ListenerContext {
        &self.ctx
    }

    pub(crate) fn send_message_listener(&self) -> &SendMessageListener {
        &self.send_message
    }

    pub(crate) fn edit_message_listener(&self) -> &EditMessageListener {
        &self.edit_message
    }

    pub(crate) fn delete_message_listener(&self) -> &DeleteMessageListener {
        &self.delete_message
    }

    pub(crate) fn send_reaction_listener(&self) -> &SendReactionListener {
        &self.send_reaction
    }

    pub(crate) fn delete_reaction_listener(&self) -> &DeleteReactionListener {
        &self.delete_reaction
    }
}
