//! Mark-all-read listener.

use palaver_core::{ChannelUserRead, ChatError, ChatResult, Cid};

use crate::listener::ListenerContext;

/// Three-phase listener for marking a whole channel read.
///
/// The optimistic phase moves the current user's read marker to the
/// newest message; a failed call only logs, since the next read event or
/// channel query restores the authoritative marker anyway.
pub(crate) struct MarkReadListener {
    ctx: ListenerContext,
}

impl MarkReadListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    /// An untracked channel passes with the default config. The precheck
    /// never creates a container; only `on_request` does.
    pub(crate) fn precheck(&self, cid: &Cid) -> ChatResult<()> {
        self.ctx.current_user()?;
        if let Some(channel) = self.ctx.registry.active_channel(cid) {
            if !channel.config().read_events {
                return Err(ChatError::validation(
                    "read events are disabled for this channel",
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn on_request(&self, cid: &Cid) {
        let Ok(user) = self.ctx.current_user() else { return };
        let channel = self.ctx.registry.channel_by_cid(cid);
        let last_read_message_id = channel.messages().last().map(|m| m.id.clone());
        channel.upsert_read(ChannelUserRead {
            user,
            last_read: Some(self.ctx.now()),
            last_read_message_id,
            unread_messages: 0,
        });
    }

    pub(crate) fn on_result(&self, cid: &Cid, result: &ChatResult<()>) {
        if let Err(error) = result {
            tracing::debug!(%cid, %error, "mark-read not delivered");
        }
    }
}
