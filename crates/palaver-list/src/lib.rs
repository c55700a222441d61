//! Message list projection for the Palaver chat core.
//!
//! Turns a container's sorted message snapshot plus read markers, typing
//! state, and visibility configuration into the typed item list a UI
//! renders: message items with grouping positions, date separators, the
//! unread separator, system notices, placeholders, and a trailing typing
//! indicator.
//!
//! The projection itself ([`project`]) is a pure function: identical
//! inputs produce identical output, with no clock reads. The
//! [`MessageListController`] wires it to live containers and re-publishes
//! the item list as an observable snapshot.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod controller;
mod date_separator;
mod item;
mod position;
mod projection;

pub use controller::MessageListController;
pub use date_separator::{DateSeparatorPolicy, DefaultDateSeparator};
pub use item::{MessageItem, MessageListItem};
pub use position::{DefaultPositionHandler, GroupPosition, MessagePositionHandler};
pub use projection::{
    DeletedMessageVisibility, ListMode, ProjectionConfig, ProjectionInput, project,
};
