//! Cumulative topology and channel counters.

/// Counters accumulated by a [`Network`](crate::Network) since creation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkMetrics {
    /// Nodes found carrying more channels than their capacity.
    pub channel_overflow_events: u64,
    /// Security-break callables scheduled.
    pub security_breaches: u64,
    /// Stale edges to a neighbor that is no longer there.
    pub phantom_links_removed: u64,
    /// Edge removals that split a grid in two.
    pub grid_splits: u64,
    /// New edges that joined two grids.
    pub grid_merges: u64,
    /// Grids created.
    pub grids_created: u64,
    /// Grids retired after losing their last member.
    pub grids_retired: u64,
    /// Channel assignment passes run.
    pub repaths: u64,
}
