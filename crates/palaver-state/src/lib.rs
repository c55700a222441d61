//! Observable state containers for the Palaver chat core.
//!
//! Per-channel, per-thread, and per-query mutable state lives here, behind
//! a single-writer publish/subscribe primitive ([`Observable`]). The
//! [`StateRegistry`] hands out containers with race-safe get-or-create
//! semantics and tears everything down at session end.
//!
//! Containers only know how an entity enters or leaves them (the
//! upsert/delete primitives); *when* to mutate is decided by the listener
//! protocol and event handler in `palaver-sync`, which both funnel through
//! the same primitives.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod channel_state;
mod message_map;
mod observable;
mod query_state;
mod registry;
mod session;
mod thread_state;

pub use channel_state::ChannelMutableState;
pub use observable::Observable;
pub use query_state::QueryChannelsMutableState;
pub use registry::StateRegistry;
pub use session::{ConnectionState, SessionState};
pub use thread_state::ThreadMutableState;
