//! Edit-message listener.

use palaver_core::{ChatError, ChatResult, Message, SyncStatus};

use crate::{
    containers::{apply_reconciled, find_message, upsert_creating},
    listener::ListenerContext,
};

/// Three-phase listener for editing an existing message.
///
/// The optimistic phase updates every container holding the message, so a
/// reply mirrored into both its thread and the channel list stays
/// consistent between the two.
pub(crate) struct EditMessageListener {
    ctx: ListenerContext,
}

impl EditMessageListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn precheck(&self, message: &Message) -> ChatResult<()> {
        self.ctx.current_user()?;
        if message.id.is_empty() {
            return Err(ChatError::validation("message id is empty"));
        }
        Ok(())
    }

    pub(crate) fn on_request(&self, message: &mut Message) {
        message.updated_locally_at = Some(self.ctx.now());
        message.sync_status = self.ctx.initial_sync_status();
        upsert_creating(&self.ctx.registry, message);
    }

    pub(crate) fn on_result(&self, requested: &Message, result: &ChatResult<Message>) {
        let stored = find_message(&self.ctx.registry, requested)
            .unwrap_or_else(|| requested.clone());
        if stored.sync_status == SyncStatus::Completed {
            return;
        }

        match result {
            Ok(confirmed) => {
                let mut merged = confirmed.clone();
                merged.sync_status = SyncStatus::Completed;
                merged.created_locally_at = stored.created_locally_at;
                apply_reconciled(&self.ctx.registry, &merged);
            },
            Err(error) => {
                let mut failed = stored;
                failed.sync_status = ListenerContext::failure_status(error);
                failed.updated_locally_at = Some(self.ctx.now());
                apply_reconciled(&self.ctx.registry, &failed);
            },
        }
    }
}
