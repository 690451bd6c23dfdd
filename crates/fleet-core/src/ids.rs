//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and kept
//! in sorted collections without ceremony.  Agent ids are allocated by the
//! orchestrator starting at [`AgentId::FIRST`]; vertex ids belong to whoever
//! built the navigation graph.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer with a short
/// display prefix (`robot-3`, `v12`).
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw integer value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Identity of a spawned robot.  Unique for the lifetime of the fleet.
    pub struct AgentId(u32) => "robot-";
}

typed_id! {
    /// Identity of a site on the navigation graph.
    pub struct VertexId(u32) => "v";
}

impl AgentId {
    /// The first id handed out by a fresh fleet.
    pub const FIRST: AgentId = AgentId(1);

    /// The id allocated immediately after `self`.
    #[inline]
    pub fn next(self) -> AgentId {
        AgentId(self.0 + 1)
    }
}

// ── EdgeKey ───────────────────────────────────────────────────────────────────

/// A **directed** connection between two vertices.
///
/// Reservations are per direction: `v1 -> v2` and `v2 -> v1` are distinct
/// keys and can be held by different agents at the same time.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    pub from: VertexId,
    pub to:   VertexId,
}

impl EdgeKey {
    #[inline]
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to }
    }

    /// The same connection travelled the other way.
    #[inline]
    pub fn reversed(self) -> Self {
        Self { from: self.to, to: self.from }
    }

    /// `true` if either endpoint is `vertex`.
    #[inline]
    pub fn touches(self, vertex: VertexId) -> bool {
        self.from == vertex || self.to == vertex
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}
