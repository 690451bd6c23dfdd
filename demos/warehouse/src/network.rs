//! Synthetic warehouse floor.
//!
//! ```text
//!   y=3   s ─ s ─ s ─ s ─ s ─ s      shelves
//!         │   │   │   │   │   │
//!   y=2   a ─ a ─ a ─ a ─ a ─ a      aisle
//!         │   │   │   │   │   │
//!   y=1   s ─ s ─ s ─ s ─ s ─ s      shelves
//!         │   │   │   │   │   │
//!   y=0   d ─ d ─ d ─ d ─ d ─ d      docks
//! ```
//!
//! Every lane is two-way.  Vertex ids are `y * COLS + x`.

use fleet_core::{Point, VertexId};
use fleet_graph::{NavNetwork, NavNetworkBuilder, Vertex};

pub const COLS: u32 = 6;
pub const ROWS: u32 = 4;

/// 2 m between grid points.
const SPACING: f64 = 2.0;

fn label(x: u32, y: u32) -> String {
    match y {
        0 => format!("dock-{x}"),
        2 => format!("aisle-{x}"),
        _ => format!("shelf-{y}-{x}"),
    }
}

/// Returns `(network, docks, every vertex)`.
pub fn build_network() -> anyhow::Result<(NavNetwork, Vec<VertexId>, Vec<VertexId>)> {
    let mut b = NavNetworkBuilder::new();
    let id = |x: u32, y: u32| VertexId(y * COLS + x);

    for y in 0..ROWS {
        for x in 0..COLS {
            let pos = Point::new(x as f64 * SPACING, y as f64 * SPACING);
            b.insert_vertex(id(x, y), Vertex::at(pos).with_meta("name", label(x, y)))?;
        }
    }
    for y in 0..ROWS {
        for x in 0..COLS {
            if x + 1 < COLS {
                b.add_lane(id(x, y), id(x + 1, y));
            }
            if y + 1 < ROWS {
                b.add_lane(id(x, y), id(x, y + 1));
            }
        }
    }

    let docks = (0..COLS).map(|x| id(x, 0)).collect();
    let all = (0..ROWS).flat_map(|y| (0..COLS).map(move |x| id(x, y))).collect();
    Ok((b.build()?, docks, all))
}
