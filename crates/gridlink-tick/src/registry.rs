//! Registry of live grids with deferred reconciliation.
//!
//! Grids created or emptied mid-tick are staged in pending sets and only
//! become (in)visible to the per-tick update loop at the next
//! [`reconcile`](GridRegistry::reconcile).

use indexmap::IndexSet;

use gridlink_core::GridId;

/// Live grid set plus pending additions and removals.
#[derive(Clone, Debug, Default)]
pub struct GridRegistry {
    live: IndexSet<GridId>,
    to_add: IndexSet<GridId>,
    to_remove: IndexSet<GridId>,
}

impl GridRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `grid` for addition, cancelling a pending removal.
    pub fn add(&mut self, grid: GridId) {
        self.to_add.insert(grid);
        self.to_remove.shift_remove(&grid);
    }

    /// Stage `grid` for removal, cancelling a pending addition.
    pub fn remove(&mut self, grid: GridId) {
        self.to_remove.insert(grid);
        self.to_add.shift_remove(&grid);
    }

    /// Apply pending removals, then pending additions.
    pub fn reconcile(&mut self) {
        for grid in self.to_remove.drain(..) {
            self.live.shift_remove(&grid);
        }
        for grid in self.to_add.drain(..) {
            self.live.insert(grid);
        }
    }

    /// Grids visible to the update loop, in registration order.
    pub fn live(&self) -> impl Iterator<Item = GridId> + '_ {
        self.live.iter().copied()
    }

    /// Number of live grids.
    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    /// Whether `grid` is live.
    pub fn is_live(&self, grid: GridId) -> bool {
        self.live.contains(&grid)
    }

    /// Number of staged additions and removals.
    pub fn pending_len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }

    /// Forget everything, live and pending.
    pub fn clear(&mut self) {
        self.live.clear();
        self.to_add.clear();
        self.to_remove.clear();
    }
}
