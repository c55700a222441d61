//! Delete-reaction listener.

use palaver_core::{ChatError, ChatResult, Message};

use crate::{containers::update_everywhere, listener::ListenerContext};

/// Three-phase listener for removing one of the current user's reactions.
///
/// The optimistic phase removes the reaction from the visible lists but
/// keeps a tombstone (`deleted_at` set) in `own_reactions` so the
/// background sync can replay the delete after an offline period.
pub(crate) struct DeleteReactionListener {
    ctx: ListenerContext,
}

impl DeleteReactionListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn precheck(&self, message_id: &str, kind: &str) -> ChatResult<()> {
        self.ctx.current_user()?;
        if kind.is_empty() {
            return Err(ChatError::validation("reaction type is empty"));
        }
        if message_id.is_empty() {
            return Err(ChatError::validation("reaction has no message id"));
        }
        Ok(())
    }

    pub(crate) fn on_request(&self, target: &Message, kind: &str) {
        let Some(user) = self.ctx.session.current_user() else { return };
        let now = self.ctx.now();
        let status = self.ctx.initial_sync_status();

        update_everywhere(&self.ctx.registry, target, |message| {
            message.remove_reaction(&user.id, kind);
            message.own_reactions.push(palaver_core::Reaction {
                message_id: message.id.clone(),
                user_id: user.id.clone(),
                kind: kind.to_string(),
                score: 0,
                sync_status: status,
                created_at: None,
                deleted_at: Some(now),
            });
        });
    }

    pub(crate) fn on_result(&self, target: &Message, kind: &str, result: &ChatResult<Message>) {
        let Some(user) = self.ctx.session.current_user() else { return };
        let terminal = match result {
            Ok(_) => None,
            Err(error) => Some(ListenerContext::failure_status(error)),
        };

        update_everywhere(&self.ctx.registry, target, |message| {
            match terminal {
                // Confirmed: the tombstone has served its purpose.
                None => message
                    .own_reactions
                    .retain(|r| !(r.user_id == user.id && r.kind == kind)),
                Some(status) => {
                    if let Some(tombstone) = message.own_reactions.iter_mut().find(|r| {
                        r.user_id == user.id && r.kind == kind && r.deleted_at.is_some()
                    }) {
                        tombstone.sync_status = status;
                    }
                },
            }
        });
    }
}
