//! Wall-clock abstraction for testability

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Trait for reading wall-clock time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the UNIX epoch
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Shared, type-erased clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wrap a clock into a [`SharedClock`]
pub fn shared<C: Clock + 'static>(clock: C) -> SharedClock {
    Arc::new(clock)
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same underlying time, so a test can hand one clone to
/// the component under test and advance the other.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current system time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a mock clock pinned to a specific instant
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(instant)) }
    }

    /// Advance the mock clock by a duration
    ///
    /// Steps past the representable range leave the clock unchanged.
    pub fn advance(&self, duration: Duration) {
        let Ok(delta) = chrono::Duration::from_std(duration) else { return };
        if let Ok(mut current) = self.current.lock() {
            if let Some(next) = current.checked_add_signed(delta) {
                *current = next;
            }
        }
    }

    /// Move the mock clock backwards by a duration
    pub fn rewind(&self, duration: Duration) {
        let Ok(delta) = chrono::Duration::from_std(duration) else { return };
        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.checked_sub_signed(delta) {
                *current = previous;
            }
        }
    }

    /// Current mock time
    pub fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Set the mock clock to a specific instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = instant;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        MockClock::now(self)
    }
}
