//! Session-scoped assembly of the synchronization components.

use std::sync::Arc;

use palaver_core::{ChatApi, Clock, User};
use palaver_state::{ConnectionState, SessionState, StateRegistry};

use crate::{coordinator::OperationCoordinator, event_handler::EventHandler};

/// One signed-in chat session: a fresh state registry, the operation
/// coordinator, and the event handler, all sharing the same session state
/// and clock.
///
/// Sign-out clears the registry and the user; containers an in-flight
/// operation still holds become orphans whose writes no reader sees.
pub struct ChatSession {
    registry: Arc<StateRegistry>,
    state: Arc<SessionState>,
    coordinator: OperationCoordinator,
    events: EventHandler,
}

impl ChatSession {
    /// Sign `user` in against `api`. The session starts `Connecting`; the
    /// transport reports [`ConnectionState`] transitions through
    /// [`set_connection`](Self::set_connection).
    pub fn sign_in(api: Arc<dyn ChatApi>, user: User, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(StateRegistry::new());
        let state = Arc::new(SessionState::new());
        state.set_current_user(Some(user));
        state.set_connection(ConnectionState::Connecting);

        let coordinator =
            OperationCoordinator::new(api, registry.clone(), state.clone(), clock);
        let events = EventHandler::new(registry.clone(), state.clone());
        Self { registry, state, coordinator, events }
    }

    /// The session's state containers.
    pub fn registry(&self) -> &Arc<StateRegistry> {
        &self.registry
    }

    /// Identity and connectivity of this session.
    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// The mutating-operation API.
    pub fn coordinator(&self) -> &OperationCoordinator {
        &self.coordinator
    }

    /// The server-event entry point.
    pub fn events(&self) -> &EventHandler {
        &self.events
    }

    /// Record a connectivity transition reported by the transport.
    pub fn set_connection(&self, connection: ConnectionState) {
        self.state.set_connection(connection);
    }

    /// Tear the session down: drop every container, clear the user, go
    /// offline. Idempotent.
    pub fn sign_out(&self) {
        self.registry.clear();
        self.state.set_current_user(None);
        self.state.set_connection(ConnectionState::Offline);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use palaver_core::{ChatError, ChatResult, Cid, Message, Reaction};

    use super::*;

    struct UnreachableApi;

    #[async_trait]
    impl ChatApi for UnreachableApi {
        async fn send_message(&self, _: &Message) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn update_message(&self, _: &Message) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn delete_message(&self, _: &str, _: bool) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn send_reaction(&self, _: &Reaction, _: bool) -> ChatResult<Reaction> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn delete_reaction(&self, _: &str, _: &str) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn mark_read(&self, _: &Cid) -> ChatResult<()> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn start_typing(&self, _: &Cid, _: Option<&str>) -> ChatResult<()> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn stop_typing(&self, _: &Cid) -> ChatResult<()> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn send_giphy(&self, _: &Message) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
        async fn shuffle_giphy(&self, _: &Message) -> ChatResult<Message> {
            Err(ChatError::transient_network("unreachable"))
        }
    }

    fn session() -> ChatSession {
        ChatSession::sign_in(
            Arc::new(UnreachableApi),
            User::new("me"),
            Arc::new(palaver_core::SystemClock),
        )
    }

    #[test]
    fn sign_in_sets_user_and_connecting() {
        let session = session();
        assert_eq!(session.state().current_user().unwrap().id, "me");
        assert_eq!(session.state().connection(), ConnectionState::Connecting);
        assert!(!session.state().is_online());
    }

    #[test]
    fn sign_out_clears_registry_and_identity() {
        let session = session();
        session.registry().channel("messaging", "general");
        session.set_connection(ConnectionState::Connected);

        session.sign_out();
        session.sign_out();

        assert!(session.registry().channels().is_empty());
        assert!(session.state().current_user().is_none());
        assert_eq!(session.state().connection(), ConnectionState::Offline);
    }

    #[test]
    fn orphaned_container_writes_are_invisible_after_sign_out() {
        let session = session();
        let orphan = session.registry().channel("messaging", "general");
        session.sign_out();

        orphan.upsert_message(Message { id: "m1".into(), ..Message::default() });

        assert!(session.registry().channels().is_empty());
    }
}
