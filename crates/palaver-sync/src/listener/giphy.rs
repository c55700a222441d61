//! Giphy send/shuffle listener.

use palaver_core::{ChatError, ChatResult, Message, SyncStatus};

use crate::{
    containers::{apply_reconciled, remove_everywhere, update_everywhere},
    listener::ListenerContext,
};

/// Listener for the two actions on an ephemeral giphy preview: committing
/// it as a real message (send) or asking for another candidate (shuffle).
///
/// Neither action mutates optimistically; the preview stays on screen
/// until the server answers. Send success removes the preview (the real
/// message arrives as a server event); shuffle success swaps the preview
/// in place.
pub(crate) struct GiphyListener {
    ctx: ListenerContext,
}

impl GiphyListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn precheck(&self, message: &Message) -> ChatResult<()> {
        self.ctx.current_user()?;
        if message.id.is_empty() {
            return Err(ChatError::validation("message id is empty"));
        }
        if !message.is_ephemeral() {
            return Err(ChatError::validation("giphy actions require an ephemeral message"));
        }
        Ok(())
    }

    pub(crate) fn on_send_result(&self, requested: &Message, result: &ChatResult<Message>) {
        match result {
            Ok(_) => remove_everywhere(&self.ctx.registry, requested),
            Err(error) => {
                let status = ListenerContext::failure_status(error);
                update_everywhere(&self.ctx.registry, requested, |message| {
                    message.sync_status = status;
                });
            },
        };
    }

    pub(crate) fn on_shuffle_result(&self, requested: &Message, result: &ChatResult<Message>) {
        match result {
            Ok(shuffled) => {
                let mut replacement = shuffled.clone();
                replacement.id = requested.id.clone();
                replacement.message_type = palaver_core::MessageType::Ephemeral;
                replacement.sync_status = SyncStatus::Completed;
                apply_reconciled(&self.ctx.registry, &replacement);
            },
            Err(error) => {
                tracing::debug!(%error, "giphy shuffle failed; preview kept");
            },
        }
    }
}
