//! Fleet configuration.
//!
//! Every tunable the traffic layer and the orchestrator consult lives here so
//! an application can load one file (the demo reads JSON through the `serde`
//! feature) and hand the same value to every component.

use crate::{CoreError, CoreResult};

/// Which edge reservations `release(agent, vertex)` drops.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReleaseScope {
    /// Drop every edge the agent holds, wherever it is on the graph.
    #[default]
    AllEdges,
    /// Drop only edges that start or end at the released vertex.
    IncidentEdges,
}

/// Top-level fleet configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// How long a reservation stays live after grant, in time units.
    pub lease_duration: f64,

    /// Minimum spacing between two retries of the same blocked agent.
    pub retry_interval: f64,

    /// Upper bound on the simulated step of one tick.  Protects movement
    /// from stalls in the driving thread.
    pub max_step: f64,

    /// Edge fraction an agent covers per time unit.  `0.05` means one edge
    /// takes 20 units regardless of its length.
    pub agent_speed: f64,

    /// Target cadence of the simulation driver, ticks per second.
    pub tick_hz: u32,

    /// Emit an observer snapshot every N ticks.  `0` disables snapshots.
    pub snapshot_interval_ticks: u64,

    /// Edge-release policy applied on every vertex transition.
    pub release_scope: ReleaseScope,

    /// Seed for driver-side randomness (demo target selection).
    pub seed: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            lease_duration:          5.0,
            retry_interval:          1.0,
            max_step:                0.1,
            agent_speed:             0.05,
            tick_hz:                 10,
            snapshot_interval_ticks: 10,
            release_scope:           ReleaseScope::AllEdges,
            seed:                    42,
        }
    }
}

impl FleetConfig {
    /// Reject values that would stall movement or make leases meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        positive("lease_duration", self.lease_duration)?;
        positive("max_step", self.max_step)?;
        positive("agent_speed", self.agent_speed)?;
        if !self.retry_interval.is_finite() || self.retry_interval < 0.0 {
            return Err(CoreError::Config(format!(
                "retry_interval must be finite and >= 0, got {}",
                self.retry_interval
            )));
        }
        if self.tick_hz == 0 {
            return Err(CoreError::Config("tick_hz must be at least 1".into()));
        }
        Ok(())
    }

    /// Wall-clock period between two ticks of the simulation driver.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }
}

fn positive(name: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be finite and > 0, got {value}")))
    }
}
