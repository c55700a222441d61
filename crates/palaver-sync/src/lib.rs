//! State synchronization for the Palaver chat core.
//!
//! Every mutating user action (send/edit/delete message, reactions,
//! mark-read, typing, giphy) is a three-phase listener: a precondition
//! check, a synchronous optimistic mutation applied before the network
//! call, and a reconciliation step once the call resolves. The
//! [`OperationCoordinator`] owns one listener per operation and drives the
//! phases; the [`EventHandler`] applies server-pushed events through the
//! same container primitives; the background sync pass replays entities
//! left `SyncNeeded` by offline or transiently failed operations.
//!
//! # Components
//!
//! - [`OperationCoordinator`]: public API, one async method per operation
//! - [`EventHandler`]: sequential, fault-isolated batch event application
//! - [`ChatSession`]: session-scoped assembly, sign-in to sign-out
//! - `listener`: the per-operation request/result state machines

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod background_sync;
mod containers;
mod coordinator;
mod event_handler;
mod listener;
mod session;

pub use coordinator::OperationCoordinator;
pub use event_handler::EventHandler;
pub use session::ChatSession;
