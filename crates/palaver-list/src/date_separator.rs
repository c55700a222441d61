//! Date-separator placement policy.

use chrono::Duration;
use palaver_core::Message;

/// Policy deciding whether a date separator precedes a message.
pub trait DateSeparatorPolicy: Send + Sync {
    /// Whether to insert a separator between `previous` and `current`.
    fn separates(&self, previous: Option<&Message>, current: &Message) -> bool;
}

/// Default policy: separator before the first message, on a calendar-day
/// change, or after a long quiet gap.
#[derive(Debug, Clone)]
pub struct DefaultDateSeparator {
    /// Quiet gap that forces a separator even within one day.
    pub minimum_gap: Duration,
}

impl Default for DefaultDateSeparator {
    fn default() -> Self {
        Self { minimum_gap: Duration::hours(4) }
    }
}

impl DateSeparatorPolicy for DefaultDateSeparator {
    fn separates(&self, previous: Option<&Message>, current: &Message) -> bool {
        let Some(previous) = previous else { return true };
        let earlier = previous.effective_created_at();
        let later = current.effective_created_at();
        earlier.date_naive() != later.date_naive() || later - earlier >= self.minimum_gap
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn message_at(y: i32, mo: u32, d: u32, h: u32) -> Message {
        Message {
            created_at: Some(Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).single().unwrap()),
            ..Message::default()
        }
    }

    #[test]
    fn first_message_gets_a_separator() {
        let policy = DefaultDateSeparator::default();
        assert!(policy.separates(None, &message_at(2024, 1, 1, 9)));
    }

    #[test]
    fn day_change_and_long_gap_separate() {
        let policy = DefaultDateSeparator::default();
        let morning = message_at(2024, 1, 1, 9);
        let noon = message_at(2024, 1, 1, 12);
        let evening = message_at(2024, 1, 1, 20);
        let next_day = message_at(2024, 1, 2, 0);

        assert!(!policy.separates(Some(&morning), &noon));
        assert!(policy.separates(Some(&noon), &evening));
        assert!(policy.separates(Some(&evening), &next_day));
    }
}
