//! `fleet-traffic`: time-leased reservations over a shared navigation graph.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`lease`]       | `Lease` (holder + grant time), expiry rule               |
//! | [`table`]       | `LeaseTable`: vertex and directed-edge reservations      |
//! | [`waiting`]     | `WaitingLists` (`BTreeMap<VertexId, Vec<AgentId>>`)      |
//! | [`coordinator`] | `TrafficCoordinator`, `PathGrant`, `Contested`           |
//!
//! # Protocol (summary)
//!
//! A path `[v0, v1, …, vn]` is reserved whole or not at all:
//!
//! ```text
//! for each (vi, vi+1):
//!     vi live-held by someone else       → deny, queue agent on vi
//!     (vi → vi+1) live-held by someone else → deny, queue agent on vi
//! all free → stamp v0..vn-1 and every edge with (agent, now)
//! ```
//!
//! A lease is live while `now - granted_at < lease_duration`.  Expired leases
//! stay in the table until overwritten, released, or purged; every scan
//! checks expiry rather than presence.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | Lease maps use `rustc_hash::FxHashMap`.                  |

pub mod coordinator;
pub mod lease;
pub mod table;
pub mod waiting;

#[cfg(test)]
mod tests;

pub use coordinator::{Contested, PathGrant, TrafficCoordinator};
pub use lease::Lease;
pub use table::LeaseTable;
pub use waiting::WaitingLists;
