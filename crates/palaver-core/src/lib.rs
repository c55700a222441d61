//! Core types for the Palaver chat state-synchronization layer.
//!
//! This crate defines the entities being synchronized (messages, reactions,
//! channels, users), the error taxonomy shared by every layer above, and the
//! two boundary abstractions the core depends on: an abstract network client
//! ([`ChatApi`]) and an injected clock ([`Clock`]).
//!
//! Nothing in this crate performs I/O. State containers, the listener
//! protocol, and the list projection live in the sibling crates and consume
//! these types.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod channel;
pub mod clock;
mod error;
mod event;
mod message;
mod user;

pub use api::ChatApi;
pub use channel::{Channel, ChannelConfig, ChannelUserRead, Cid, CidParseError};
pub use clock::{Clock, SystemClock};
pub use error::{ChatError, ChatResult};
pub use event::ChatEvent;
pub use message::{Attachment, Message, MessageType, Reaction, ReactionGroup, SyncStatus};
pub use user::User;
