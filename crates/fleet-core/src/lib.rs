//! `fleet-core`: foundational types for the fleet traffic workspace.
//!
//! Every other `fleet-*` crate depends on this one.  It has no `fleet-*`
//! dependencies and only `rand` and `thiserror` externally (plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`ids`]    | `AgentId`, `VertexId`, `EdgeKey`                          |
//! | [`point`]  | `Point` (planar x/y), linear interpolation                |
//! | [`time`]   | `SimTime`, `SimClock`                                     |
//! | [`status`] | `AgentStatus` vocabulary                                  |
//! | [`config`] | `FleetConfig`, `ReleaseScope`                             |
//! | [`rng`]    | `FleetRng` (seeded, for drivers and demos)                |
//! | [`error`]  | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod point;
pub mod rng;
pub mod status;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{FleetConfig, ReleaseScope};
pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, EdgeKey, VertexId};
pub use point::Point;
pub use rng::FleetRng;
pub use status::AgentStatus;
pub use time::{SimClock, SimTime};
