//! Per-operation request/result listeners.
//!
//! Each mutating operation is a small stateful listener with up to three
//! hooks: `precheck` (validate before any network call; a failure means
//! no state was touched), `on_request` (synchronous optimistic mutation),
//! and `on_result` (reconciliation once the network call resolved). The
//! coordinator composes one instance of each and drives the phases.

mod delete_message;
mod delete_reaction;
mod edit_message;
mod giphy;
mod mark_read;
mod send_message;
mod send_reaction;
mod typing;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use palaver_core::{ChatError, ChatResult, Clock, SyncStatus, User};
use palaver_state::{SessionState, StateRegistry};

pub(crate) use delete_message::DeleteMessageListener;
pub(crate) use delete_reaction::DeleteReactionListener;
pub(crate) use edit_message::EditMessageListener;
pub(crate) use giphy::GiphyListener;
pub(crate) use mark_read::MarkReadListener;
pub(crate) use send_message::SendMessageListener;
pub(crate) use send_reaction::SendReactionListener;
pub(crate) use typing::TypingListener;

/// Shared dependencies of every listener.
#[derive(Clone)]
pub(crate) struct ListenerContext {
    pub(crate) registry: Arc<StateRegistry>,
    pub(crate) session: Arc<SessionState>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl ListenerContext {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The signed-in user, or the precondition failure every mutating
    /// operation shares.
    pub(crate) fn current_user(&self) -> ChatResult<User> {
        self.session
            .current_user()
            .ok_or_else(|| ChatError::Generic("no user set, sign in first".into()))
    }

    /// Sync status an optimistic mutation starts in: `InProgress` while
    /// online, `SyncNeeded` when the call will be queued for later.
    pub(crate) fn initial_sync_status(&self) -> SyncStatus {
        if self.session.is_online() { SyncStatus::InProgress } else { SyncStatus::SyncNeeded }
    }

    /// Status a failed operation settles in, per error classification.
    pub(crate) fn failure_status(error: &ChatError) -> SyncStatus {
        if error.is_permanent() {
            SyncStatus::FailedPermanently
        } else {
            SyncStatus::SyncNeeded
        }
    }
}
