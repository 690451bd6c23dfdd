//! Fleet observer trait for progress reporting and data collection.

use fleet_core::SimTime;

use crate::{FleetSnapshot, TickReport};

/// Callbacks invoked by [`FleetOrchestrator::step`][crate::FleetOrchestrator::step]
/// and the runtime loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: blocked-agent counter
///
/// ```rust,ignore
/// struct BlockedCounter { worst: usize }
///
/// impl FleetObserver for BlockedCounter {
///     fn on_tick_end(&mut self, report: &TickReport) {
///         self.worst = self.worst.max(report.blocked);
///     }
/// }
/// ```
pub trait FleetObserver {
    /// Called before any agent moves.
    fn on_tick_start(&mut self, _tick: u64, _now: SimTime) {}

    /// Called once the tick's three phases are done.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called every `config.snapshot_interval_ticks` ticks with an owned copy
    /// of every agent.
    fn on_snapshot(&mut self, _snapshot: &FleetSnapshot) {}

    /// Called once when the driving loop stops.
    fn on_sim_end(&mut self, _final_tick: u64) {}
}

/// A [`FleetObserver`] that does nothing.
pub struct NoopObserver;

impl FleetObserver for NoopObserver {}
