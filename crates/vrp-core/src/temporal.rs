//! # Temporal Types — Injected Clock
//!
//! Every "now" read in the workspace goes through [`Clock`]. Production code
//! uses [`SystemClock`]; tests drive expiry deterministically with
//! [`ManualClock`].
//!
//! Claims carry Unix seconds (`iat`, `exp`, `nbf`); projections for clients
//! and audit records use `DateTime<Utc>` truncated to seconds.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Timelike, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current Unix time in seconds.
    fn now_secs(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Shared handle to a clock.
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_seconds(Utc::now())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicI64,
}

impl ManualClock {
    /// Start at the given Unix time.
    pub fn at(secs: i64) -> Self {
        Self {
            secs: AtomicI64::new(secs),
        }
    }

    /// Start at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::at(Utc::now().timestamp())
    }

    /// Move the clock forward (or backward, for negative values).
    pub fn advance(&self, secs: i64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute Unix time.
    pub fn set(&self, secs: i64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        from_epoch_secs(self.secs.load(Ordering::SeqCst)).unwrap_or_default()
    }

    fn now_secs(&self) -> i64 {
        self.secs.load(Ordering::SeqCst)
    }
}

/// Convert Unix seconds into a UTC datetime. `None` when out of range.
pub fn from_epoch_secs(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_has_no_subseconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(1_000);
        assert_eq!(clock.now_secs(), 1_000);
        clock.advance(301);
        assert_eq!(clock.now_secs(), 1_301);
        assert_eq!(clock.now().timestamp(), 1_301);
        clock.set(5);
        assert_eq!(clock.now_secs(), 5);
    }

    #[test]
    fn shared_clock_is_object_safe() {
        let clock: SharedClock = Arc::new(ManualClock::at(42));
        assert_eq!(clock.now_secs(), 42);
    }

    #[test]
    fn epoch_conversion() {
        let dt = from_epoch_secs(1_767_225_600).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }
}
