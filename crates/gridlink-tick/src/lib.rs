//! Cooperative tick scheduler for gridlink.
//!
//! [`TickScheduler`] is driven by an external per-tick event source with
//! four phases (world start, world end, server end, client start). It
//! drains deferred callables under a wall-clock budget, reconciles the
//! registry of live grids and invokes their update hook, advances
//! background simulation jobs in equal time slices, and ticks down the
//! ephemeral color entries.
//!
//! Everything runs on the tick thread except job submission, which goes
//! through a cloneable [`JobSubmitter`] backed by a crossbeam channel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod callable;
pub mod color;
pub mod config;
pub mod job;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod world;

pub use callable::{CallQueue, Callable};
pub use color::{ColorEntry, ColorTracker};
pub use config::{ConfigError, SchedulerConfig};
pub use job::{time_slice, JobSubmitter, SimulationJob};
pub use metrics::{DrainReport, JobSliceReport, SchedulerMetrics, ServerTickReport};
pub use registry::GridRegistry;
pub use render::{RenderMode, RenderWatcher};
pub use scheduler::{GridTicker, PhaseReport, RefreshListener, TickPhase, TickScheduler};
pub use world::WorldSession;
