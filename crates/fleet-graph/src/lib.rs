//! `fleet-graph`: the navigation-graph boundary of the fleet.
//!
//! The traffic layer never looks at graph internals.  It consumes a
//! [`NavGraph`]: vertex lookup, vertex position, and a shortest-path query
//! returning an ordered list of vertex ids.  [`NavNetwork`] is the in-memory
//! implementation used by tests and the demo; a graph loaded from a floor-plan
//! file can implement the trait directly.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`graph`]   | `NavGraph` trait, `Vertex`                                 |
//! | [`network`] | `NavNetwork` (CSR + R-tree), `NavNetworkBuilder`           |
//! | [`path`]    | Dijkstra over the CSR adjacency                            |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Vertex`.              |

pub mod error;
pub mod graph;
pub mod network;
pub mod path;


pub use error::{GraphError, GraphResult};
pub use graph::{NavGraph, Vertex};
pub use network::{NavNetwork, NavNetworkBuilder};
