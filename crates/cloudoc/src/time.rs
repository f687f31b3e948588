//! Clock abstraction for credential expiry
//!
//! The credential manager never calls `Utc::now()` directly; it asks a `Clock`,
//! so expiry and refresh timing can be driven by hand in tests.

use chrono::{DateTime, Utc};

/// Trait for getting the current time
pub trait Clock: Send + Sync {
    /// Returns the current time
    fn now(&self) -> DateTime<Utc>;
}

/// System clock that returns the actual current time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for testing - only moves when told to
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock(std::sync::Arc<std::sync::Mutex<DateTime<Utc>>>);

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
impl ManualClock {
    /// Creates a new manual clock stopped at the given time
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(time)))
    }

    /// Moves the clock forward; clones observe the change
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}
