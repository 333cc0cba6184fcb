//! Strongly-typed identifiers.
//!
//! Nodes, connections and grids live in generational slabs owned by the
//! network. Their ids pack the slot index into the upper 32 bits and the
//! slot generation into the lower 32 bits, so a removed entity's id never
//! resolves again even after its slot is recycled.

use std::fmt;

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Build an id from a slab slot and its generation.
            pub fn from_parts(slot: u32, generation: u32) -> Self {
                Self(((slot as u64) << 32) | generation as u64)
            }

            /// Slab slot index.
            pub fn slot(self) -> u32 {
                (self.0 >> 32) as u32
            }

            /// Slot generation at allocation time.
            pub fn generation(self) -> u32 {
                self.0 as u32
            }

            /// Raw packed representation.
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}.{}", $tag, self.slot(), self.generation())
            }
        }

        impl From<u64> for $name {
            fn from(v: u64) -> Self {
                Self(v)
            }
        }
    };
}

handle_id!(
    /// Identifies a network-capable device (a graph vertex).
    NodeId,
    "node"
);

handle_id!(
    /// Identifies an edge between two nodes.
    ConnectionId,
    "conn"
);

handle_id!(
    /// Identifies a connected component of nodes.
    GridId,
    "grid"
);

/// Identifies a simulated world (a dimension or session).
///
/// Per-world deferred queues and simulation jobs are keyed by this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorldId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a persisted grid storage record.
///
/// Nodes remember which storage they belonged to so that a reloaded
/// grid can reattach to its saved state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(pub u64);

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StorageId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
