//! Clock abstraction: the engine never reads wall-clock time directly.
//!
//! Every time-dependent computation takes a `&dyn Clock` explicitly rather
//! than reaching for `SystemTime::now()`. A [`MockClock`] lets tests advance
//! time deterministically.

use std::cell::Cell;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A point in time, totally ordered. Wraps a UTC timestamp so it serializes
/// cleanly (§6 persisted-state layout) without pulling in `SystemTime`'s
/// platform-dependent epoch semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Construct a timestamp from a UTC `DateTime`.
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// The UNIX epoch, used as the default "never" sentinel origin.
    pub fn epoch() -> Self {
        Self(DateTime::UNIX_EPOCH)
    }

    /// Duration elapsed from `earlier` to `self`. Saturates at zero if
    /// `earlier` is later than `self` — the clock is monotonic non-decreasing
    /// by contract, so a negative elapsed duration indicates caller misuse,
    /// not a value we want to propagate as a negative number.
    pub fn since(&self, earlier: Timestamp) -> TimeDelta {
        let delta = self.0 - earlier.0;
        if delta < TimeDelta::zero() {
            TimeDelta::zero()
        } else {
            delta
        }
    }

    /// Advance this timestamp by a duration.
    pub fn plus(&self, delta: TimeDelta) -> Self {
        Self(self.0 + delta)
    }

    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Source of timestamps for the engine. Implementations must be monotonically
/// non-decreasing: `now()` called twice in sequence never goes backwards.
pub trait Clock: fmt::Debug {
    fn now(&self) -> Timestamp;
}

/// Real wall-clock, backed by `Utc::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(Utc::now())
    }
}

/// A clock that only advances when told to. Used in tests to exercise
/// cooldowns and decay windows deterministically (§5, §9 "decay time-step
/// quantisation").
#[derive(Debug)]
pub struct MockClock {
    now: Cell<Timestamp>,
}

impl MockClock {
    /// Start the mock clock at a fixed instant.
    pub fn at(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Start the mock clock at the UNIX epoch.
    pub fn new() -> Self {
        Self::at(Timestamp::epoch())
    }

    /// Move the clock forward by `delta`. Panics if `delta` is negative,
    /// since the clock contract is monotonic non-decreasing.
    pub fn advance(&self, delta: TimeDelta) {
        assert!(delta >= TimeDelta::zero(), "MockClock cannot move backwards");
        self.now.set(self.now.get().plus(delta));
    }

    /// Jump the clock to an explicit instant. Panics if it would move the
    /// clock backwards.
    pub fn set(&self, ts: Timestamp) {
        assert!(ts >= self.now.get(), "MockClock cannot move backwards");
        self.now.set(ts);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
