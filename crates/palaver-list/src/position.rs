//! Grouping of consecutive same-sender messages.

use chrono::Duration;
use palaver_core::Message;

/// Where a message sits inside a group of consecutive messages from the
/// same sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupPosition {
    /// First message of a group of two or more.
    Top,
    /// Surrounded by group members on both sides.
    Middle,
    /// Last message of a group of two or more.
    Bottom,
    /// Not part of any group.
    #[default]
    None,
}

/// Policy deciding the [`GroupPosition`] of a message relative to its
/// neighbors in display order.
pub trait MessagePositionHandler: Send + Sync {
    /// Position of `current` between its neighbors. `separated_before` /
    /// `separated_after` report date-separator boundaries, which always
    /// break a group.
    fn position(
        &self,
        previous: Option<&Message>,
        current: &Message,
        next: Option<&Message>,
        separated_before: bool,
        separated_after: bool,
    ) -> GroupPosition;
}

/// Default policy: consecutive messages from the same sender group while
/// their creation times stay within a fixed window.
#[derive(Debug, Clone)]
pub struct DefaultPositionHandler {
    /// Maximum gap between two messages of one group.
    pub window: Duration,
}

impl Default for DefaultPositionHandler {
    fn default() -> Self {
        Self { window: Duration::seconds(60) }
    }
}

impl DefaultPositionHandler {
    fn groups_with(&self, earlier: &Message, later: &Message) -> bool {
        earlier.user.id == later.user.id
            && later.effective_created_at() - earlier.effective_created_at() <= self.window
    }
}

impl MessagePositionHandler for DefaultPositionHandler {
    fn position(
        &self,
        previous: Option<&Message>,
        current: &Message,
        next: Option<&Message>,
        separated_before: bool,
        separated_after: bool,
    ) -> GroupPosition {
        let with_previous =
            !separated_before && previous.is_some_and(|p| self.groups_with(p, current));
        let with_next = !separated_after && next.is_some_and(|n| self.groups_with(current, n));
        match (with_previous, with_next) {
            (false, false) => GroupPosition::None,
            (false, true) => GroupPosition::Top,
            (true, true) => GroupPosition::Middle,
            (true, false) => GroupPosition::Bottom,
        }
    }
}
