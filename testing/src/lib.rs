//! # Todolist Testing
//!
//! Testing utilities and helpers for the todolist reducer architecture.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - An in-memory snapshot store
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::ephemeral())
//!     .given_state(TodoListState::seeded())
//!     .when_action(TodoAction::ToggleTodo { id: TodoId::new(1) })
//!     .then_state(|state| assert_eq!(state.completed_count(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todolist_core::environment::{Clock, IdGenerator};

mod snapshot_mocks;

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::FixedClock;
    /// use todolist_core::environment::Clock;
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

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// Predictable ids: `start`, `start + 1`, `start + 2`, ...
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::SequentialIdGenerator;
    /// use todolist_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::starting_at(100);
    /// assert_eq!(ids.next_id(), 100);
    /// assert_eq!(ids.next_id(), 101);
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicI64,
    }

    impl SequentialIdGenerator {
        /// Start issuing ids from `start`
        #[must_use]
        pub const fn starting_at(start: i64) -> Self {
            Self {
                next: AtomicI64::new(start),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::starting_at(1)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> i64 {
            self.next.fetch_add(1, Ordering::SeqCst)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequentialIdGenerator, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use snapshot_mocks::InMemorySnapshotStore;
