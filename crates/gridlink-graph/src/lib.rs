//! Device network topology for gridlink.
//!
//! A [`Network`] owns every [`Node`], [`Connection`] and [`Grid`] in
//! generational slab arenas and hands out copyable ids. Grids are the
//! connected components of the graph: linking two nodes merges their
//! grids, and removing an edge splits a grid when the far side can no
//! longer reach the grid's pivot.
//!
//! Channel usage is assigned per grid by the reference allocator in
//! [`pathing`], built on the per-node primitives in [`channels`]. The
//! [`TickScheduler`](gridlink_tick::TickScheduler) drives it through the
//! [`GridTicker`](gridlink_tick::GridTicker) impl on [`Network`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod channels;
pub mod config;
pub mod connection;
pub mod grid;
pub mod metrics;
pub mod network;
pub mod node;
pub mod pathing;
pub mod security;
pub mod split;
pub mod traversal;

pub use arena::{Slab, SlabKey};
pub use config::NetworkConfig;
pub use connection::Connection;
pub use grid::{Grid, GridService, ServiceFactory};
pub use metrics::NetworkMetrics;
pub use network::Network;
pub use node::Node;
pub use pathing::AllocationReport;
pub use security::{KeyMatchPolicy, OpenPolicy, SecurityPolicy};
pub use split::{GridPropagator, SplitDetector};
pub use traversal::{ConnectionVisitor, NodeVisitor};

#[cfg(test)]
pub(crate) mod testing {
    use gridlink_tick::{SchedulerConfig, TickScheduler};

    pub fn scheduler() -> TickScheduler {
        TickScheduler::new(SchedulerConfig::default()).unwrap()
    }
}
