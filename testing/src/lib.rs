//! # Todoflow Testing
//!
//! Testing utilities and helpers for the todoflow data layer.
//!
//! This crate provides:
//! - Mock clocks for deterministic timestamps
//! - A failing storage backend for error-path tests
//! - A fluent Given-When-Then builder for reducer tests
//! - Assertion helpers for effect lists
//!
//! ## Example
//!
//! ```ignore
//! use todoflow_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new()
//!     .given_state(AppState::new())
//!     .when_action(TodoAction::SelectGroup { uid: GroupUid::new(3) })
//!     .then_state(|state| {
//!         assert_eq!(state.selected_group, GroupUid::new(3));
//!     })
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todoflow_core::environment::Clock;

mod reducer_test;
mod storage_mocks;

/// Mock clocks for deterministic tests
pub mod mocks {
    use std::sync::{Arc, Mutex};

    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todoflow_testing::mocks::FixedClock;
    /// use todoflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Manually advanced clock for ordering-sensitive tests
    ///
    /// Starts at a given time and only moves when told to, so tests can
    /// give each mutation a distinct, known timestamp.
    ///
    /// # Example
    ///
    /// ```
    /// use todoflow_testing::mocks::{ManualClock, test_clock};
    /// use todoflow_core::environment::Clock;
    ///
    /// let clock = ManualClock::new(test_clock().now());
    /// let first = clock.now();
    /// clock.advance(chrono::Duration::seconds(60));
    /// assert_eq!(clock.now() - first, chrono::Duration::seconds(60));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a manual clock starting at the given time
        #[must_use]
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(start)),
            }
        }

        /// Set the clock to an absolute time
        #[allow(clippy::expect_used)] // The setters never panic, so the lock cannot poison
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().expect("clock lock poisoned") = time;
        }

        /// Advance the clock by a duration
        #[allow(clippy::expect_used)] // The setters never panic, so the lock cannot poison
        pub fn advance(&self, duration: chrono::Duration) {
            *self.time.lock().expect("clock lock poisoned") += duration;
        }
    }

    impl Clock for ManualClock {
        #[allow(clippy::expect_used)] // The setters never panic, so the lock cannot poison
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().expect("clock lock poisoned")
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use storage_mocks::FailingStorage;
