//! Clock implementations.
//!
//! The store reads the clock once per commit, so every timestamp a batch
//! writes comes from a single `now()` call.

use crate::infrastructure::ports::ClockPort;
use chrono::{DateTime, Utc};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that moves forward by `step` on every read, for ordering tests.
#[cfg(test)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    step: chrono::Duration,
    reads: std::sync::atomic::AtomicI32,
}

#[cfg(test)]
impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
        Self {
            start,
            step,
            reads: std::sync::atomic::AtomicI32::new(0),
        }
    }
}

#[cfg(test)]
impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self
            .reads
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.start + self.step * n
    }
}
