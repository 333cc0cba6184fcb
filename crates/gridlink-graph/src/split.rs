//! The two traversal visitors behind grid maintenance: pivot
//! reachability after an edge removal, and relabeling a component into
//! a target grid.

use gridlink_core::{GridId, NodeId};
use gridlink_tick::TickScheduler;

use crate::network::Network;
use crate::traversal::NodeVisitor;

/// Stops the walk as soon as the pivot has been reached.
#[derive(Debug)]
pub struct SplitDetector {
    pivot: NodeId,
    found: bool,
}

impl SplitDetector {
    /// Look for `pivot`.
    pub fn new(pivot: NodeId) -> Self {
        Self {
            pivot,
            found: false,
        }
    }

    /// Whether the pivot was reached.
    pub fn pivot_found(&self) -> bool {
        self.found
    }
}

impl NodeVisitor for SplitDetector {
    fn visit_node(&mut self, _network: &mut Network, node: NodeId) -> bool {
        self.found = self.found || node == self.pivot;
        !self.found
    }
}

/// Moves every node it reaches into `grid`.
///
/// Expands through nodes that were not yet in the grid, and through the
/// grid's pivot so a freshly created grid grows from its center.
pub struct GridPropagator<'a> {
    grid: GridId,
    scheduler: &'a mut TickScheduler,
}

impl<'a> GridPropagator<'a> {
    /// Relabel into `grid`; grids emptied on the way are retired through
    /// `scheduler`.
    pub fn new(grid: GridId, scheduler: &'a mut TickScheduler) -> Self {
        Self { grid, scheduler }
    }
}

impl NodeVisitor for GridPropagator<'_> {
    fn visit_node(&mut self, network: &mut Network, node: NodeId) -> bool {
        let current = network.node(node).and_then(|n| n.grid());
        let is_pivot = network.grid(self.grid).is_some_and(|g| g.pivot() == node);
        if current != Some(self.grid) || is_pivot {
            network.set_grid(node, self.grid, self.scheduler);
            true
        } else {
            false
        }
    }
}
