//! A simulation session: one network driven by one scheduler.
//!
//! [`Session`] owns both halves so topology operations always reach the
//! scheduler they defer work to, and the tick phases always update the
//! grids of the network they belong to. There is no process-wide state;
//! two sessions never share queues, grids or jobs.
//!
//! # World unload
//!
//! [`unload_world()`](Session::unload_world) destroys every node placed
//! in the world before tearing down the world's scheduler session, so
//! grids spanning the unloaded world are split and repathed like any
//! other removal. Callables and jobs still queued for the world are
//! dropped without running.

use std::sync::Arc;

use gridlink_core::{
    CallableError, ConnectError, ConnectionId, Direction, GridError, GridId, NodeId, NodeOwner,
    NodeProvider, WorldId,
};
use gridlink_graph::Network;
use gridlink_tick::{
    DrainReport, JobSliceReport, JobSubmitter, PhaseReport, RenderMode, ServerTickReport,
    SimulationJob, TickPhase, TickScheduler,
};

use crate::config::{ConfigError, SessionConfig};

// Compile-time assertion: a Session can be handed to a tick thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

/// Network plus scheduler for one simulation.
pub struct Session {
    network: Network,
    scheduler: TickScheduler,
}

impl Session {
    /// Create a session after validating `config`.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scheduler = TickScheduler::new(config.scheduler)?;
        Ok(Self {
            network: Network::new(config.network),
            scheduler,
        })
    }

    /// The topology.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable topology access, e.g. to register grid services or change
    /// the channel mode.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Mutable scheduler access, e.g. to add visual-refresh listeners or
    /// color entries.
    pub fn scheduler_mut(&mut self) -> &mut TickScheduler {
        &mut self.scheduler
    }

    // ── Tick phases ─────────────────────────────────────────────────

    /// Dispatch one phase raised by the external tick source.
    pub fn run_phase(&mut self, phase: TickPhase) -> PhaseReport {
        self.scheduler.run_phase(phase, &mut self.network)
    }

    /// Drain `world`'s deferred callables.
    pub fn world_tick_start(&mut self, world: WorldId) -> DrainReport {
        self.scheduler.world_tick_start(world)
    }

    /// Advance `world`'s simulation jobs by one slice each.
    pub fn world_tick_end(&mut self, world: WorldId) -> JobSliceReport {
        self.scheduler.world_tick_end(world)
    }

    /// Reconcile and update grids, then drain the global queue.
    pub fn server_tick_end(&mut self) -> ServerTickReport {
        self.scheduler.server_tick_end(&mut self.network)
    }

    /// Tick client colors and report whether a visual refresh fired.
    pub fn client_tick_start(&mut self, mode: RenderMode) -> bool {
        self.scheduler.client_tick_start(mode)
    }

    // ── Deferred work ───────────────────────────────────────────────

    /// Queue `f` against `world`, or globally when `None`. Returns
    /// `false` if `world` is not loaded and the callable was dropped.
    pub fn add_callable<F>(&mut self, world: Option<WorldId>, f: F) -> bool
    where
        F: FnOnce(Option<WorldId>) -> Result<(), CallableError> + Send + 'static,
    {
        self.scheduler.add_callable(world, f)
    }

    /// Register a job for `world` from the tick thread. Returns `false`
    /// if `world` is not loaded and the job was dropped.
    pub fn register_job(&mut self, world: WorldId, job: Box<dyn SimulationJob>) -> bool {
        self.scheduler.register_job(world, job)
    }

    /// A handle for submitting jobs from other threads.
    pub fn job_submitter(&self) -> JobSubmitter {
        self.scheduler.job_submitter()
    }

    // ── Topology ────────────────────────────────────────────────────

    /// Add a node for `owner`.
    pub fn create_node(&mut self, owner: Arc<dyn NodeOwner>) -> NodeId {
        self.network.create_node(owner)
    }

    /// Refresh `node` from its owner and reconcile its links with the
    /// neighbors `provider` reports.
    pub fn update_state(
        &mut self,
        node: NodeId,
        provider: &dyn NodeProvider,
    ) -> Result<(), GridError> {
        self.network.update_state(node, provider, &mut self.scheduler)
    }

    /// Link two nodes.
    pub fn connect(
        &mut self,
        node: NodeId,
        other: NodeId,
        direction: Option<Direction>,
    ) -> Result<ConnectionId, ConnectError> {
        self.network.connect(node, other, direction, &mut self.scheduler)
    }

    /// Remove `connection` from `node`.
    pub fn disconnect(&mut self, node: NodeId, connection: ConnectionId) -> Result<(), GridError> {
        self.network.disconnect(node, connection, &mut self.scheduler)
    }

    /// Remove `node` and all of its links.
    pub fn destroy_node(&mut self, node: NodeId) -> Result<(), GridError> {
        self.network.destroy_node(node, &mut self.scheduler)
    }

    /// The grid of `node`, creating one if it has none.
    pub fn internal_grid(&mut self, node: NodeId) -> Result<GridId, GridError> {
        self.network.internal_grid(node, &mut self.scheduler)
    }

    // ── Worlds ──────────────────────────────────────────────────────

    /// Start tracking `world`.
    pub fn load_world(&mut self, world: WorldId) {
        self.scheduler.load_world(world);
    }

    /// Destroy every node placed in `world` and drop its queued work.
    ///
    /// Returns the number of nodes destroyed.
    pub fn unload_world(&mut self, world: WorldId) -> usize {
        let nodes = self.network.nodes_in_world(world);
        let mut destroyed = 0;
        for node in nodes {
            match self.network.destroy_node(node, &mut self.scheduler) {
                Ok(()) => destroyed += 1,
                Err(e) => log::debug!("unloading {world}: {e}"),
            }
        }
        self.scheduler.unload_world(world);
        destroyed
    }

    /// Forget every registered grid, as on server shutdown.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use gridlink_test_utils::{CountingJob, RecordingOwner};

    fn session() -> Session {
        Session::new(SessionConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = SessionConfig::default();
        cfg.scheduler.job_time_per_tick_ms = 0;
        assert!(matches!(
            Session::new(cfg),
            Err(ConfigError::Scheduler(_))
        ));
    }

    #[test]
    fn phases_dispatch_through_run_phase() {
        let mut s = session();
        let a = s.create_node(RecordingOwner::cable().shared());
        s.internal_grid(a).unwrap();

        match s.run_phase(TickPhase::ServerEnd) {
            PhaseReport::ServerEnd(report) => assert_eq!(report.grids_updated, 1),
            other => panic!("unexpected report {other:?}"),
        }
        assert_eq!(
            s.run_phase(TickPhase::ClientStart(RenderMode::CableView)),
            PhaseReport::ClientStart { refreshed: true }
        );
    }

    #[test]
    fn unload_world_destroys_its_nodes_and_drops_work() {
        let mut s = session();
        let w = WorldId(4);
        s.load_world(w);
        let here: Vec<_> = (0..3)
            .map(|x| s.create_node(RecordingOwner::cable().at(4, x, 0, 0).shared()))
            .collect();
        let elsewhere = s.create_node(RecordingOwner::cable().at(5, 0, 0, 0).shared());
        s.connect(here[0], here[1], None).unwrap();
        s.connect(here[1], here[2], None).unwrap();
        s.connect(here[2], elsewhere, None).unwrap();

        let job = CountingJob::new();
        let runs = job.runs();
        assert!(s.register_job(w, Box::new(job)));
        assert!(s.add_callable(Some(w), |_| Err(CallableError::new("must not run"))));

        assert_eq!(s.unload_world(w), 3);
        assert_eq!(s.network().node_count(), 1);
        assert!(s.network().grid_of(elsewhere).is_some());
        assert!(!s.scheduler().has_world(w));

        let report = s.world_tick_start(w);
        assert_eq!(report.executed + report.failed, 0);
        s.world_tick_end(w);
        assert_eq!(runs.load(std::sync::atomic::Ordering::Relaxed), 0);

        assert!(!s.add_callable(Some(w), |_| Ok(())));
        assert!(!s.scheduler().has_world(w));
    }

    #[test]
    fn shutdown_clears_grid_registry() {
        let mut s = session();
        let a = s.create_node(RecordingOwner::cable().shared());
        s.internal_grid(a).unwrap();
        s.server_tick_end();
        assert_eq!(s.scheduler().grids().live_len(), 1);
        s.shutdown();
        assert_eq!(s.scheduler().grids().live_len(), 0);
    }

    #[test]
    fn callables_see_their_world() {
        let mut s = session();
        s.load_world(WorldId(2));
        let seen = Arc::new(std::sync::Mutex::new(None));
        let sink = Arc::clone(&seen);
        s.add_callable(Some(WorldId(2)), move |w| {
            *sink.lock().unwrap() = w;
            Ok(())
        });
        s.world_tick_start(WorldId(2));
        assert_eq!(*seen.lock().unwrap(), Some(WorldId(2)));
        assert!(s.scheduler().config().callable_budget > Duration::ZERO);
    }
}
