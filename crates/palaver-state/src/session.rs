//! Session-scoped connection and identity state.

use palaver_core::User;
use tokio::sync::watch;

use crate::observable::Observable;

/// Connection state of the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// Live socket to the server.
    Connected,
    /// Connection attempt in progress.
    Connecting,
    /// No connectivity; optimistic mutations are queued as `SyncNeeded`.
    #[default]
    Offline,
}

/// Observable identity and connectivity for one signed-in session.
///
/// The listener protocol reads this to pick the initial sync status of an
/// optimistic mutation and to validate "current user" preconditions.
#[derive(Debug, Default)]
pub struct SessionState {
    user: Observable<Option<User>>,
    connection: Observable<ConnectionState>,
}

impl SessionState {
    /// Create state with no user and no connectivity.
    pub fn new() -> Self {
        Self::default()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.user.get()
    }

    /// Set or clear the signed-in user.
    pub fn set_current_user(&self, user: Option<User>) {
        self.user.set(user);
    }

    /// Subscribe to user changes.
    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    /// Current connection state.
    pub fn connection(&self) -> ConnectionState {
        self.connection.get()
    }

    /// Update the connection state.
    pub fn set_connection(&self, state: ConnectionState) {
        self.connection.set(state);
    }

    /// Subscribe to connection-state changes.
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Whether requests can reach the server right now.
    pub fn is_online(&self) -> bool {
        self.connection.get() == ConnectionState::Connected
    }
}
