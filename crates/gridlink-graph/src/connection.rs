//! Edges between nodes.

use gridlink_core::{Direction, NodeId};

/// An edge between two nodes.
///
/// Both endpoints list the connection; the network keeps that symmetric.
/// `direction` is the side of `a` the edge leaves through, `None` for
/// non-directional path holders.
#[derive(Clone, Debug)]
pub struct Connection {
    pub(crate) a: NodeId,
    pub(crate) b: NodeId,
    pub(crate) direction: Option<Direction>,
    pub(crate) used_channels: u32,
    /// Upstream endpoint once the edge is part of a routing tree.
    pub(crate) controller_route: Option<NodeId>,
    pub(crate) visit_token: u64,
}

impl Connection {
    pub(crate) fn new(a: NodeId, b: NodeId, direction: Option<Direction>) -> Self {
        Self {
            a,
            b,
            direction,
            used_channels: 0,
            controller_route: None,
            visit_token: 0,
        }
    }

    /// First endpoint.
    pub fn a(&self) -> NodeId {
        self.a
    }

    /// Second endpoint.
    pub fn b(&self) -> NodeId {
        self.b
    }

    /// Whether the edge is bound to a side.
    pub fn has_direction(&self) -> bool {
        self.direction.is_some()
    }

    /// Whether `node` is an endpoint.
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint that is not `node`.
    ///
    /// `node` must be an endpoint; callers check
    /// [`touches`](Self::touches) first where that is not already known.
    /// Release builds return `a` for a non-endpoint.
    pub fn other_side(&self, node: NodeId) -> NodeId {
        debug_assert!(self.touches(node), "{node} is not an endpoint of this connection");
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }

    /// The side of `node` the edge leaves through.
    pub fn direction_from(&self, node: NodeId) -> Option<Direction> {
        if node == self.a {
            self.direction
        } else {
            self.direction.map(Direction::opposite)
        }
    }

    /// Channels carried by the edge after the last assignment pass.
    pub fn used_channels(&self) -> u32 {
        self.used_channels
    }

    /// Upstream endpoint (toward the controller), if routed.
    pub fn controller_route(&self) -> Option<NodeId> {
        self.controller_route
    }
}
