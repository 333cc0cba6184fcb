//! Gridlink: channel-routed device networks for block worlds.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all gridlink sub-crates. For most users, adding `gridlink` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use gridlink::prelude::*;
//!
//! struct Device {
//!     flags: NodeFlags,
//!     controller: bool,
//! }
//!
//! impl NodeOwner for Device {
//!     fn flags(&self) -> NodeFlags { self.flags }
//!     fn location(&self) -> Option<Location> { None }
//!     fn is_controller(&self) -> bool { self.controller }
//!     fn on_notification(&self, _notification: Notification) {}
//!     fn security_break(&self) {}
//! }
//!
//! let mut session = Session::new(SessionConfig::default()).unwrap();
//! let controller = session.create_node(Arc::new(Device {
//!     flags: NodeFlags::of(&[NodeFlag::DenseCapacity]),
//!     controller: true,
//! }));
//! let drive = session.create_node(Arc::new(Device {
//!     flags: NodeFlags::of(&[NodeFlag::RequireChannel]),
//!     controller: false,
//! }));
//! session.connect(controller, drive, None).unwrap();
//!
//! // Grids are repathed at the end of the server tick.
//! session.run_phase(TickPhase::ServerEnd);
//! assert!(session.network().meets_channel_requirements(drive));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gridlink-core` | Ids, directions, colors, flags, owner contracts, errors |
//! | [`tick`] | `gridlink-tick` | Tick scheduler, deferred callables, jobs, color entries |
//! | [`graph`] | `gridlink-graph` | Nodes, connections, grids, traversal, channel routing |
//! | [`engine`] | `gridlink-engine` | `Session` and its configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, contracts and errors (`gridlink-core`).
pub use gridlink_core as types;

/// Cooperative tick scheduler (`gridlink-tick`).
///
/// [`tick::TickScheduler`] drains deferred callables, slices simulation
/// jobs and drives the per-grid update hook.
pub use gridlink_tick as tick;

/// Topology and channel routing (`gridlink-graph`).
///
/// [`graph::Network`] owns nodes, connections and grids; grid services
/// implement [`graph::GridService`].
pub use gridlink_graph as graph;

/// Session orchestration (`gridlink-engine`).
pub use gridlink_engine as engine;

/// Common imports for typical gridlink usage.
///
/// ```rust
/// use gridlink::prelude::*;
/// ```
pub mod prelude {
    // Core types and contracts
    pub use gridlink_core::{
        ChannelMode, Color, Direction, DirectionSet, GridId, Location, NodeFlag, NodeFlags,
        NodeId, NodeOwner, NodeProvider, NodeRecord, Notification, Position, WorldId,
    };

    // Errors
    pub use gridlink_core::{CallableError, ConnectError, GridError};

    // Scheduler
    pub use gridlink_tick::{PhaseReport, RenderMode, SimulationJob, TickPhase, TickScheduler};

    // Topology
    pub use gridlink_graph::{GridService, Network, NetworkConfig, SecurityPolicy};

    // Engine
    pub use gridlink_engine::{Session, SessionConfig};
}
