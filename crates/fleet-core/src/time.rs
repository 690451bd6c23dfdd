//! Simulation time model.
//!
//! # Design
//!
//! Time is a continuous `SimTime` measured in abstract time units (the demo
//! maps one unit to one wall-clock second).  Every time-dependent operation
//! takes `now` as an explicit argument instead of reading a clock, so tests
//! can drive the fleet with hand-picked timestamps and the lease/backoff
//! arithmetic stays deterministic.
//!
//! [`SimClock`] is the only place that touches the wall clock; the runtime
//! uses it to stamp each tick.

use std::fmt;
use std::time::Instant;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute timestamp in simulation time units.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn from_secs(secs: f64) -> SimTime {
        SimTime(secs)
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Units elapsed from `earlier` to `self`.  Negative if `earlier` is in
    /// the future; callers that need a step length clamp it themselves.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Wall-clock source for `SimTime`, anchored at construction.
#[derive(Clone, Debug)]
pub struct SimClock {
    origin: Instant,
}

impl SimClock {
    /// Start a clock reading `SimTime::ZERO` right now.
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    /// Elapsed wall time since [`start`](Self::start), as `SimTime`.
    #[inline]
    pub fn now(&self) -> SimTime {
        SimTime(self.origin.elapsed().as_secs_f64())
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::start()
    }
}
