//! Graph vertices and their cached connection criteria.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use gridlink_core::{
    Color, ConnectionId, Direction, DirectionSet, GridId, Location, NodeFlag, NodeFlags, NodeId,
    NodeOwner, StorageId, UNSET_SECURITY_KEY,
};

// ── Criteria word ───────────────────────────────────────────────

const CAPACITY_MASK: u32 = 0b111;
const COLOR_SHIFT: u32 = 3;
const COLOR_MASK: u32 = 0x1F;
const SIDES_SHIFT: u32 = 8;

/// Pack a node's connection criteria into one word.
///
/// Bits 0..3 hold the capacity class (0 cannot carry, 1 regular,
/// 2 dense), bits 3..8 the color ordinal, and bit `8 + side` is set for
/// every connectable side.
pub fn pack_criteria(flags: NodeFlags, color: Color, sides: DirectionSet) -> u32 {
    let class = if flags.contains(NodeFlag::CannotCarry) {
        0
    } else if flags.contains(NodeFlag::DenseCapacity) {
        2
    } else {
        1
    };
    class | (u32::from(color.ordinal()) << COLOR_SHIFT) | (u32::from(sides.bits()) << SIDES_SHIFT)
}

/// Capacity class stored in a criteria word.
pub fn criteria_capacity_class(criteria: u32) -> u32 {
    criteria & CAPACITY_MASK
}

/// Color stored in a criteria word.
pub fn criteria_color(criteria: u32) -> Color {
    Color::from_ordinal(((criteria >> COLOR_SHIFT) & COLOR_MASK) as u8).unwrap_or_default()
}

/// Connectable sides stored in a criteria word.
pub fn criteria_sides(criteria: u32) -> DirectionSet {
    DirectionSet::from_bits((criteria >> SIDES_SHIFT) as u8)
}

// ── Node ────────────────────────────────────────────────────────

/// A network-capable device.
///
/// Fields are only mutated by the owning [`Network`](crate::Network);
/// the accessors expose the state the rest of the system observes.
pub struct Node {
    pub(crate) owner: Arc<dyn NodeOwner>,
    pub(crate) flags: NodeFlags,
    pub(crate) criteria: u32,
    pub(crate) location: Option<Location>,
    pub(crate) controller: bool,
    /// Index 0 is the controller route once one is assigned.
    pub(crate) connections: SmallVec<[ConnectionId; 6]>,
    pub(crate) grid: Option<GridId>,
    pub(crate) visit_token: u64,

    pub(crate) used_channels: u32,
    pub(crate) last_used_channels: u32,
    pub(crate) subtree_max_channels: u32,
    pub(crate) highest_similar_ancestor: Option<NodeId>,
    pub(crate) subtree_allows_compressed: bool,

    pub(crate) security_key: i64,
    pub(crate) player_id: i32,
    pub(crate) storage: Option<StorageId>,
}

impl Node {
    pub(crate) fn new(owner: Arc<dyn NodeOwner>) -> Self {
        let mut node = Self {
            owner,
            flags: NodeFlags::empty(),
            criteria: 0,
            location: None,
            controller: false,
            connections: SmallVec::new(),
            grid: None,
            visit_token: 0,
            used_channels: 0,
            last_used_channels: 0,
            subtree_max_channels: 0,
            highest_similar_ancestor: None,
            subtree_allows_compressed: false,
            security_key: UNSET_SECURITY_KEY,
            player_id: -1,
            storage: None,
        };
        node.refresh();
        node
    }

    /// Re-read flags, criteria and placement from the owner.
    pub(crate) fn refresh(&mut self) {
        self.flags = self.owner.flags();
        self.criteria = pack_criteria(
            self.flags,
            self.owner.color(),
            self.owner.connectable_sides(),
        );
        self.location = self.owner.location();
        self.controller = self.owner.is_controller();
    }

    /// Whether this node accepts a link on `side` from a node of `color`.
    pub(crate) fn accepts(&self, side: Option<Direction>, color: Color) -> bool {
        if let Some(side) = side {
            if !self.sides().contains(side) {
                return false;
            }
        }
        self.color().matches(color)
    }

    /// The device behind the node.
    pub fn owner(&self) -> &Arc<dyn NodeOwner> {
        &self.owner
    }

    /// Capability flags as of the last state update.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether the node has `flag`.
    pub fn has_flag(&self, flag: NodeFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Packed connection criteria, see [`pack_criteria`].
    pub fn criteria(&self) -> u32 {
        self.criteria
    }

    /// Color from the criteria word.
    pub fn color(&self) -> Color {
        criteria_color(self.criteria)
    }

    /// Connectable sides from the criteria word.
    pub fn sides(&self) -> DirectionSet {
        criteria_sides(self.criteria)
    }

    /// Cached placement.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Whether the device is a controller.
    pub fn is_controller(&self) -> bool {
        self.controller
    }

    /// Incident connections; index 0 is the controller route once
    /// assigned.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }

    /// The grid the node belongs to.
    pub fn grid(&self) -> Option<GridId> {
        self.grid
    }

    /// Working channel count of the current assignment pass.
    pub fn used_channels(&self) -> u32 {
        self.used_channels
    }

    /// Finalized channel count.
    pub fn last_used_channels(&self) -> u32 {
        self.last_used_channels
    }

    /// Capacity bottleneck on the route to the controller.
    pub fn subtree_max_channels(&self) -> u32 {
        self.subtree_max_channels
    }

    /// Highest ancestor sharing this node's capacity bucket; only set
    /// between route assignment and finalization.
    pub fn highest_similar_ancestor(&self) -> Option<NodeId> {
        self.highest_similar_ancestor
    }

    /// Whether every node on the route allows compressed channels.
    pub fn subtree_allows_compressed_channels(&self) -> bool {
        self.subtree_allows_compressed
    }

    /// Last security key seen.
    pub fn security_key(&self) -> i64 {
        self.security_key
    }

    /// Owning player, `-1` when unowned.
    pub fn player_id(&self) -> i32 {
        self.player_id
    }

    /// Storage record handle.
    pub fn storage(&self) -> Option<StorageId> {
        self.storage
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("flags", &self.flags)
            .field("location", &self.location)
            .field("connections", &self.connections)
            .field("grid", &self.grid)
            .field("used_channels", &self.used_channels)
            .field("last_used_channels", &self.last_used_channels)
            .finish_non_exhaustive()
    }
}
