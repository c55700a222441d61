//! Delete-message listener.

use palaver_core::{ChatError, ChatResult, Message, SyncStatus};

use crate::{
    containers::{apply_reconciled, find_message, remove_everywhere, upsert_creating},
    listener::ListenerContext,
};

/// Three-phase listener for deleting a message.
///
/// Soft deletion tombstones the message (`deleted_at` set) so the UI can
/// render "message deleted"; hard deletion removes it from every
/// container outright.
pub(crate) struct DeleteMessageListener {
    ctx: ListenerContext,
}

impl DeleteMessageListener {
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

    pub(crate) fn on_request(&self, message: &mut Message, hard: bool) {
        if hard {
            remove_everywhere(&self.ctx.registry, message);
            return;
        }
        message.deleted_at = Some(self.ctx.now());
        message.sync_status = self.ctx.initial_sync_status();
        upsert_creating(&self.ctx.registry, message);
    }

    pub(crate) fn on_result(&self, requested: &Message, result: &ChatResult<Message>) {
        let Some(stored) = find_message(&self.ctx.registry, requested) else {
            // Hard delete already removed the entry; nothing to reconcile.
            return;
        };
        if stored.sync_status == SyncStatus::Completed {
            return;
        }

        match result {
            Ok(confirmed) => {
                let mut merged = confirmed.clone();
                merged.sync_status = SyncStatus::Completed;
                if merged.deleted_at.is_none() {
                    merged.deleted_at = stored.deleted_at;
                }
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
