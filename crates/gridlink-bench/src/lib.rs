//! Benchmark profiles for the gridlink device network.
//!
//! Provides deterministic, pre-built topologies:
//!
//! - [`line_profile`]: controller, a run of cables, one device
//! - [`mesh_profile`]: square cable mesh with a corner controller and
//!   devices scattered by seed
//! - [`ring_profile`]: cable ring, every edge on a cycle

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use gridlink_core::{Direction, GridId, NodeId};
use gridlink_graph::{Network, NetworkConfig};
use gridlink_test_utils::RecordingOwner;
use gridlink_tick::{SchedulerConfig, TickScheduler};

/// A built topology with the scheduler it was built against.
pub struct Profile {
    /// The topology.
    pub network: Network,
    /// Scheduler that received the grid registrations.
    pub scheduler: TickScheduler,
    /// Every node, in creation order.
    pub nodes: Vec<NodeId>,
}

impl Profile {
    fn empty() -> Self {
        Self {
            network: Network::new(NetworkConfig::default()),
            // The default budgets are valid.
            scheduler: TickScheduler::new(SchedulerConfig::default())
                .unwrap_or_else(|e| panic!("default scheduler config rejected: {e}")),
            nodes: Vec::new(),
        }
    }

    fn add(&mut self, owner: RecordingOwner) -> NodeId {
        let id = self.network.create_node(owner.shared());
        self.nodes.push(id);
        id
    }

    fn link(&mut self, a: NodeId, b: NodeId, dir: Option<Direction>) {
        if let Err(e) = self.network.connect(a, b, dir, &mut self.scheduler) {
            panic!("profile link {a} -> {b} failed: {e}");
        }
    }

    /// The grid holding the first node.
    pub fn grid(&self) -> Option<GridId> {
        self.nodes.first().and_then(|n| self.network.grid_of(*n))
    }
}

/// Controller, `cables` regular cables in series, then one device.
pub fn line_profile(cables: usize) -> Profile {
    let mut p = Profile::empty();
    let mut prev = p.add(RecordingOwner::controller());
    for _ in 0..cables {
        let next = p.add(RecordingOwner::cable());
        p.link(prev, next, Some(Direction::East));
        prev = next;
    }
    let device = p.add(RecordingOwner::device());
    p.link(prev, device, Some(Direction::East));
    p
}

/// `side` x `side` mesh of dense cables with a controller linked to the
/// first cable and `devices` devices attached at seeded positions.
pub fn mesh_profile(side: usize, devices: usize, seed: u64) -> Profile {
    let mut p = Profile::empty();
    let controller = p.add(RecordingOwner::controller());
    let cells: Vec<_> = (0..side * side)
        .map(|_| p.add(RecordingOwner::dense_cable()))
        .collect();

    for row in 0..side {
        for col in 0..side {
            let here = cells[row * side + col];
            if col + 1 < side {
                p.link(here, cells[row * side + col + 1], Some(Direction::East));
            }
            if row + 1 < side {
                p.link(here, cells[(row + 1) * side + col], Some(Direction::South));
            }
        }
    }
    if let Some(first) = cells.first() {
        p.link(controller, *first, Some(Direction::Down));
    }

    for i in 0..devices as u64 {
        let device = p.add(RecordingOwner::device());
        let h = (seed ^ i).wrapping_mul(6364136223846793007).wrapping_add(1442695040888963407);
        let cell = cells[(h >> 33) as usize % cells.len().max(1)];
        p.link(cell, device, None);
    }
    p
}

/// `n` cables linked in a ring.
pub fn ring_profile(n: usize) -> Profile {
    let mut p = Profile::empty();
    let nodes: Vec<_> = (0..n).map(|_| p.add(RecordingOwner::cable())).collect();
    for i in 0..n {
        p.link(nodes[i], nodes[(i + 1) % n], None);
    }
    p
}
