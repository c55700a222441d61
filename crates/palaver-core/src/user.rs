//! Chat user model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat user.
///
/// Only the fields the state layer needs for identity, read tracking, and
/// typing indication; profile data stays behind the network boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// When the user became a member of the channel being viewed.
    /// `None` when membership is unknown in the current context.
    pub joined_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a user with the given id and an empty name.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), name: String::new(), joined_at: None }
    }
}
