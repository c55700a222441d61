//! Send-reaction listener.

use palaver_core::{ChatError, ChatResult, Message, Reaction, SyncStatus};

use crate::{containers::update_everywhere, listener::ListenerContext};

/// Three-phase listener for adding a reaction.
///
/// The optimistic update lands in every container holding the message.
/// Under enforce-unique the user's previous reaction is superseded
/// atomically within the same container update, so no reader ever
/// observes both.
pub(crate) struct SendReactionListener {
    ctx: ListenerContext,
}

impl SendReactionListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn precheck(&self, reaction: &Reaction) -> ChatResult<()> {
        self.ctx.current_user()?;
        if reaction.kind.is_empty() {
            return Err(ChatError::validation("reaction type is empty"));
        }
        if reaction.message_id.is_empty() {
            return Err(ChatError::validation("reaction has no message id"));
        }
        Ok(())
    }

    /// Optimistic phase. `target` identifies the message (id, cid,
    /// parent) being reacted to.
    pub(crate) fn on_request(
        &self,
        target: &Message,
        reaction: &mut Reaction,
        enforce_unique: bool,
    ) {
        if let Some(user) = self.ctx.session.current_user() {
            reaction.user_id = user.id;
        }
        if reaction.score == 0 {
            reaction.score = 1;
        }
        reaction.sync_status = self.ctx.initial_sync_status();

        let optimistic = reaction.clone();
        update_everywhere(&self.ctx.registry, target, |message| {
            message.upsert_reaction(optimistic.clone(), enforce_unique, true);
        });
    }

    pub(crate) fn on_result(
        &self,
        target: &Message,
        reaction: &Reaction,
        result: &ChatResult<Reaction>,
    ) {
        let status = match result {
            Ok(_) => SyncStatus::Completed,
            Err(error) => ListenerContext::failure_status(error),
        };
        let confirmed_at = match result {
            Ok(confirmed) => confirmed.created_at,
            Err(_) => None,
        };

        update_everywhere(&self.ctx.registry, target, |message| {
            for list in [&mut message.own_reactions, &mut message.latest_reactions] {
                if let Some(stored) = list
                    .iter_mut()
                    .find(|r| r.user_id == reaction.user_id && r.kind == reaction.kind)
                {
                    // Duplicate result delivery: already reconciled.
                    if stored.sync_status == SyncStatus::Completed {
                        continue;
                    }
                    stored.sync_status = status;
                    if stored.created_at.is_none() {
                        stored.created_at = confirmed_at;
                    }
                }
            }
        });
    }
}
