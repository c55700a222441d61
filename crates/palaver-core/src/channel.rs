//! Channel identity and channel-scoped models.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::User;

/// Channel identifier: a `type:id` pair such as `messaging:general`.
///
/// Every server event and every message carries one, and the state registry
/// keys channel containers by it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cid {
    /// Channel type segment (e.g. `messaging`).
    pub channel_type: String,
    /// Channel id segment, unique within the type.
    pub channel_id: String,
}

impl Cid {
    /// Build a cid from its two segments.
    pub fn new(channel_type: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self { channel_type: channel_type.into(), channel_id: channel_id.into() }
    }

    /// True when either segment is empty.
    pub fn is_empty(&self) -> bool {
        self.channel_type.is_empty() || self.channel_id.is_empty()
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel_type, self.channel_id)
    }
}

impl From<Cid> for String {
    fn from(cid: Cid) -> Self {
        cid.to_string()
    }
}

impl TryFrom<String> for Cid {
    type Error = CidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Cid {
    type Err = CidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((channel_type, channel_id))
                if !channel_type.is_empty() && !channel_id.is_empty() =>
            {
                Ok(Self::new(channel_type, channel_id))
            },
            _ => Err(CidParseError { input: s.to_string() }),
        }
    }
}

/// Failure to parse a `type:id` channel identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed cid: expected `type:id`, got {input:?}")]
pub struct CidParseError {
    /// The rejected input.
    pub input: String,
}

/// Per-channel feature configuration relevant to the state layer.
///
/// The server owns the full channel config; only the flags that gate local
/// preconditions are mirrored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Whether typing start/stop events may be sent for this channel.
    pub typing_events: bool,
    /// Whether read receipts may be sent for this channel.
    pub read_events: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { typing_events: true, read_events: true }
    }
}

/// A chat channel as seen by query-list containers and event routing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier.
    pub cid: Cid,
    /// Display name.
    pub name: String,
    /// Feature flags gating local preconditions.
    #[serde(default)]
    pub config: ChannelConfig,
    /// Server creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Server deletion time, set once the channel is deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// One user's read marker inside a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelUserRead {
    /// The reading user. `user.joined_at` participates in read-state
    /// computation: messages older than the membership are not counted
    /// against this reader.
    pub user: User,
    /// Last time this user read the channel.
    pub last_read: Option<DateTime<Utc>>,
    /// Id of the newest message covered by `last_read`, when known.
    pub last_read_message_id: Option<String>,
    /// Number of messages this user has not read yet.
    pub unread_messages: u32,
}
