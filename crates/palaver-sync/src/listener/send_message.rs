//! Send-message listener.

use palaver_core::{ChatError, ChatResult, Message, SyncStatus};
use uuid::Uuid;

use crate::{
    containers::{apply_reconciled, find_message, upsert_creating},
    listener::ListenerContext,
};

/// Three-phase listener for sending a new message.
pub(crate) struct SendMessageListener {
    ctx: ListenerContext,
}

impl SendMessageListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    /// Fails fast on drafts that can never be accepted: no signed-in
    /// user, no target channel, or nothing to send.
    pub(crate) fn precheck(&self, message: &Message) -> ChatResult<()> {
        self.ctx.current_user()?;
        if message.cid.is_empty() {
            return Err(ChatError::validation("message has no channel"));
        }
        if message.text.trim().is_empty() && message.attachments.is_empty() {
            return Err(ChatError::validation("message text and attachments are both empty"));
        }
        Ok(())
    }

    /// Optimistic phase: stamp identity and local creation time, then
    /// surface the pending message in its channel (and thread) container.
    pub(crate) fn on_request(&self, message: &mut Message) {
        if message.id.is_empty() {
            message.id = Uuid::new_v4().to_string();
        }
        if let Some(user) = self.ctx.session.current_user() {
            message.user = user;
        }
        if message.created_locally_at.is_none() {
            message.created_locally_at = Some(self.ctx.now());
        }
        message.sync_status = self.ctx.initial_sync_status();
        upsert_creating(&self.ctx.registry, message);
    }

    /// Reconciliation phase. A message already `Completed` is left alone,
    /// which makes duplicate or out-of-order result delivery harmless.
    pub(crate) fn on_result(&self, requested: &Message, result: &ChatResult<Message>) {
        let stored = find_message(&self.ctx.registry, requested)
            .unwrap_or_else(|| requested.clone());
        if stored.sync_status == SyncStatus::Completed {
            return;
        }

        match result {
            Ok(confirmed) => {
                let mut merged = confirmed.clone();
                if merged.id.is_empty() {
                    merged.id = stored.id.clone();
                }
                if merged.cid.is_empty() {
                    merged.enrich_with_cid(&stored.cid);
                }
                merged.created_locally_at = stored.created_locally_at;
                merged.sync_status = SyncStatus::Completed;
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
