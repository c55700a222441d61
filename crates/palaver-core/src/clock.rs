//! Clock abstraction for deterministic testing.
//!
//! Every "now" the core reads (local creation stamps, typing cooldown
//! arithmetic) goes through an injected [`Clock`], so identical inputs
//! produce identical state in tests and simulation.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    ///
    /// Implementations must never go backwards within one session.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub mod test_utils {
    //! Deterministic clock for tests across the workspace.

    use std::sync::Mutex;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::Clock;

    /// Manually advanced clock. Starts at a fixed instant so tests are
    /// reproducible without seeding.
    #[derive(Debug)]
    pub struct FixedClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Clock pinned to `2024-01-01T00:00:00Z`.
        pub fn new() -> Self {
            Self::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
        }

        /// Clock pinned to the given instant.
        pub fn at(now: DateTime<Utc>) -> Self {
            Self { now: Mutex::new(now) }
        }

        /// Advance the clock by `millis` milliseconds.
        pub fn advance_millis(&self, millis: i64) {
            let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *now += Duration::milliseconds(millis);
        }
    }

    impl Default for FixedClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }
}
