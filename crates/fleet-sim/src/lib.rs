//! `fleet-sim`: fleet orchestrator and tick loop.
//!
//! # Three-phase tick
//!
//! ```text
//! delta = clamp(now - last_tick, 0, max_step)      (0 on the first tick)
//!   ① Advance  : every MOVING agent steps by delta × agent_speed
//!                (parallel with the `parallel` feature).
//!   ② Release  : for each vertex crossing, ascending AgentId:
//!                  release(agent, left) → retry every BLOCKED waiter
//!   ③ Retry    : every BLOCKED agent whose last retry is ≥ retry_interval
//!                old re-requests its path
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`fleet`]    | `FleetOrchestrator<G>`: spawn, assign, cancel, tick      |
//! | [`builder`]  | `FleetBuilder<G>`                                        |
//! | [`observer`] | `FleetObserver` hooks, `NoopObserver`                    |
//! | [`report`]   | `TickReport`, `FleetSnapshot`                            |
//! | [`command`]  | `FleetCommand`, `Pending<T>` replies                     |
//! | [`runtime`]  | `FleetRuntime` (single writer), `FleetHandle`            |
//! | [`error`]    | `FleetError`, `FleetResult<T>`                           |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the advance phase on Rayon's thread pool.         |
//! | `fx-hash`  | FxHashMap lease maps in `fleet-traffic`.               |
//! | `serde`    | Derives `Serialize`/`Deserialize` on reports/snapshots.|
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_core::SimTime;
//! use fleet_sim::{FleetBuilder, NoopObserver};
//!
//! let mut fleet = FleetBuilder::new(network).spawn_at(dock).build()?;
//! fleet.assign(AgentId::FIRST, shelf, SimTime::ZERO)?;
//! fleet.run_fixed(200, 0.1, &mut NoopObserver);
//! ```

pub mod builder;
pub mod command;
pub mod error;
pub mod fleet;
pub mod observer;
pub mod report;
pub mod runtime;

#[cfg(test)]
mod tests;

pub use builder::FleetBuilder;
pub use command::{FleetCommand, Pending};
pub use error::{FleetError, FleetResult};
pub use fleet::FleetOrchestrator;
pub use observer::{FleetObserver, NoopObserver};
pub use report::{FleetSnapshot, TickReport};
pub use runtime::{FleetHandle, FleetRuntime, DEFAULT_REPLY_TIMEOUT};
