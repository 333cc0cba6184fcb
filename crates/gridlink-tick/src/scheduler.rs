//! The tick scheduler: phase dispatch over queues, grids, jobs and colors.

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;

use gridlink_core::{CallableError, GridId, WorldId};

use crate::callable::{CallQueue, Callable};
use crate::color::ColorTracker;
use crate::config::{ConfigError, SchedulerConfig};
use crate::job::{JobSubmission, JobSubmitter, SimulationJob};
use crate::metrics::{DrainReport, JobSliceReport, SchedulerMetrics, ServerTickReport};
use crate::registry::GridRegistry;
use crate::render::{RenderMode, RenderWatcher};
use crate::world::WorldSession;

// ── GridTicker ──────────────────────────────────────────────────

/// Receiver of the per-tick grid update hook.
///
/// Implemented by the topology layer; the scheduler only knows grid ids.
pub trait GridTicker {
    /// Run the update hook of one live grid.
    fn update_grid(&mut self, grid: GridId);
}

/// A [`GridTicker`] that ignores every grid.
impl GridTicker for () {
    fn update_grid(&mut self, _grid: GridId) {}
}

// ── TickPhase ───────────────────────────────────────────────────

/// One of the four phases raised by the external tick source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickPhase {
    /// Start of one world's tick.
    WorldStart(WorldId),
    /// End of one world's tick.
    WorldEnd(WorldId),
    /// End of the server tick.
    ServerEnd,
    /// Start of the client tick, with the current render mode.
    ClientStart(RenderMode),
}

/// What a phase did, per [`TickPhase`] variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhaseReport {
    /// [`TickPhase::WorldStart`]: the world queue drain.
    WorldStart(DrainReport),
    /// [`TickPhase::WorldEnd`]: the job slice.
    WorldEnd(JobSliceReport),
    /// [`TickPhase::ServerEnd`]: grids, colors and the global drain.
    ServerEnd(ServerTickReport),
    /// [`TickPhase::ClientStart`]: whether a visual refresh fired.
    ClientStart {
        /// A render-mode change triggered the refresh listeners.
        refreshed: bool,
    },
}

// ── TickScheduler ───────────────────────────────────────────────

/// Listener invoked when the render mode changes.
pub type RefreshListener = Box<dyn FnMut(RenderMode) + Send>;

/// Cooperative scheduler owned by the enclosing session.
///
/// All state is touched from the tick thread only, except job
/// submission which goes through [`JobSubmitter`].
pub struct TickScheduler {
    config: SchedulerConfig,
    global: CallQueue,
    worlds: IndexMap<WorldId, WorldSession>,
    grids: GridRegistry,
    job_tx: Sender<JobSubmission>,
    job_rx: Receiver<JobSubmission>,
    server_colors: ColorTracker,
    client_colors: ColorTracker,
    render: RenderWatcher,
    refresh_listeners: Vec<RefreshListener>,
    metrics: SchedulerMetrics,
}

impl TickScheduler {
    /// Create a scheduler after validating `config`.
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (job_tx, job_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            config,
            global: CallQueue::new(),
            worlds: IndexMap::new(),
            grids: GridRegistry::new(),
            job_tx,
            job_rx,
            server_colors: ColorTracker::new(),
            client_colors: ColorTracker::new(),
            render: RenderWatcher::new(),
            refresh_listeners: Vec::new(),
            metrics: SchedulerMetrics::default(),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }

    // ── Deferred callables ──────────────────────────────────────

    /// Queue `f` against `world`, or on the global queue when `None`.
    ///
    /// World callables run at that world's next tick start; global ones
    /// at the next server tick end. A callable for a world that is not
    /// loaded is dropped and `false` is returned.
    pub fn add_callable<F>(&mut self, world: Option<WorldId>, f: F) -> bool
    where
        F: FnOnce(Option<WorldId>) -> Result<(), CallableError> + Send + 'static,
    {
        let callable: Callable = Box::new(f);
        match world {
            Some(w) => match self.worlds.get_mut(&w) {
                Some(session) => {
                    session.push_callable(callable);
                    true
                }
                None => {
                    log::debug!("dropping callable for {w}: world not loaded");
                    self.metrics.work_dropped += 1;
                    false
                }
            },
            None => {
                self.global.push(callable);
                true
            }
        }
    }

    /// Callables queued against `world` (`None` for the global queue).
    pub fn pending_callables(&self, world: Option<WorldId>) -> usize {
        match world {
            Some(w) => self.worlds.get(&w).map_or(0, WorldSession::pending_callables),
            None => self.global.len(),
        }
    }

    // ── Worlds ──────────────────────────────────────────────────

    /// Create the session for `world` if it does not exist yet.
    ///
    /// This is the only way a world gains a session; work addressed to
    /// any other world is dropped.
    pub fn load_world(&mut self, world: WorldId) {
        self.worlds.entry(world).or_default();
    }

    /// Drop the session for `world`: its queued callables and jobs are
    /// discarded without running. Returns whether a session existed.
    pub fn unload_world(&mut self, world: WorldId) -> bool {
        // Route in-flight submissions first so none outlive the session.
        self.route_submissions();
        match self.worlds.shift_remove(&world) {
            Some(session) => {
                log::trace!(
                    "unloading {world}: dropping {} callables and {} jobs",
                    session.pending_callables(),
                    session.active_jobs()
                );
                true
            }
            None => false,
        }
    }

    /// Whether `world` has a session.
    pub fn has_world(&self, world: WorldId) -> bool {
        self.worlds.contains_key(&world)
    }

    // ── Jobs ────────────────────────────────────────────────────

    /// Cloneable handle for registering jobs from other threads.
    pub fn job_submitter(&self) -> JobSubmitter {
        JobSubmitter::new(self.job_tx.clone())
    }

    /// Register `job` against `world` from the tick thread.
    ///
    /// A job for a world that is not loaded is dropped and `false` is
    /// returned.
    pub fn register_job(&mut self, world: WorldId, job: Box<dyn SimulationJob>) -> bool {
        match self.worlds.get_mut(&world) {
            Some(session) => {
                session.push_job(job);
                true
            }
            None => {
                log::debug!("dropping job for {world}: world not loaded");
                self.metrics.work_dropped += 1;
                false
            }
        }
    }

    /// Jobs registered against `world` that still report work.
    ///
    /// Submissions still in flight from other threads are not counted
    /// until the next world tick end routes them.
    pub fn active_jobs(&self, world: WorldId) -> usize {
        self.worlds.get(&world).map_or(0, WorldSession::active_jobs)
    }

    fn route_submissions(&mut self) {
        while let Ok((world, job)) = self.job_rx.try_recv() {
            self.register_job(world, job);
        }
    }

    // ── Grids ───────────────────────────────────────────────────

    /// Stage `grid` for addition to the live set.
    pub fn add_grid(&mut self, grid: GridId) {
        self.grids.add(grid);
    }

    /// Stage `grid` for removal from the live set.
    pub fn remove_grid(&mut self, grid: GridId) {
        self.grids.remove(grid);
    }

    /// The live-grid registry.
    pub fn grids(&self) -> &GridRegistry {
        &self.grids
    }

    // ── Colors and rendering ────────────────────────────────────

    /// Color entries ticked at server tick end.
    pub fn server_colors_mut(&mut self) -> &mut ColorTracker {
        &mut self.server_colors
    }

    /// Color entries ticked at client tick start.
    pub fn client_colors_mut(&mut self) -> &mut ColorTracker {
        &mut self.client_colors
    }

    /// Server-side color entries.
    pub fn server_colors(&self) -> &ColorTracker {
        &self.server_colors
    }

    /// Client-side color entries.
    pub fn client_colors(&self) -> &ColorTracker {
        &self.client_colors
    }

    /// Register a listener for visual-refresh requests.
    pub fn on_visual_refresh(&mut self, listener: RefreshListener) {
        self.refresh_listeners.push(listener);
    }

    // ── Phases ──────────────────────────────────────────────────

    /// Dispatch one phase. `ticker` is only used by
    /// [`TickPhase::ServerEnd`].
    pub fn run_phase(&mut self, phase: TickPhase, ticker: &mut dyn GridTicker) -> PhaseReport {
        match phase {
            TickPhase::WorldStart(w) => PhaseReport::WorldStart(self.world_tick_start(w)),
            TickPhase::WorldEnd(w) => PhaseReport::WorldEnd(self.world_tick_end(w)),
            TickPhase::ServerEnd => PhaseReport::ServerEnd(self.server_tick_end(ticker)),
            TickPhase::ClientStart(mode) => PhaseReport::ClientStart {
                refreshed: self.client_tick_start(mode),
            },
        }
    }

    /// Drain `world`'s callable queue under the callable budget.
    pub fn world_tick_start(&mut self, world: WorldId) -> DrainReport {
        let budget = self.config.callable_budget;
        let Some(session) = self.worlds.get_mut(&world) else {
            return DrainReport::default();
        };
        let report = session.drain(world, budget);
        self.metrics.record_drain(&report);
        report
    }

    /// Advance `world`'s jobs by an equal share of the per-tick job
    /// budget, dropping the ones that finished.
    pub fn world_tick_end(&mut self, world: WorldId) -> JobSliceReport {
        self.route_submissions();
        let budget_us = self.config.job_budget_us();
        let Some(session) = self.worlds.get_mut(&world) else {
            return JobSliceReport::default();
        };
        let report = session.advance_jobs(budget_us);
        self.metrics.job_slices += report.jobs as u64;
        self.metrics.jobs_completed += report.completed as u64;
        report
    }

    /// Tick server colors, reconcile the grid registry, update every live
    /// grid, then drain the global queue.
    pub fn server_tick_end(&mut self, ticker: &mut dyn GridTicker) -> ServerTickReport {
        let colors_evicted = self.server_colors.tick();

        self.grids.reconcile();
        let mut grids_updated = 0;
        for grid in self.grids.live() {
            ticker.update_grid(grid);
            grids_updated += 1;
        }
        self.metrics.grid_updates += grids_updated as u64;

        let drain = self.global.drain(None, self.config.callable_budget);
        self.metrics.record_drain(&drain);

        ServerTickReport {
            grids_updated,
            colors_evicted,
            drain,
        }
    }

    /// Tick client colors and fire the visual-refresh listeners if the
    /// render mode changed. Returns whether a refresh fired.
    pub fn client_tick_start(&mut self, mode: RenderMode) -> bool {
        self.client_colors.tick();
        if !self.render.observe(mode) {
            return false;
        }
        for listener in &mut self.refresh_listeners {
            listener(mode);
        }
        self.metrics.visual_refreshes += 1;
        true
    }

    /// Forget every registered grid, live and pending.
    pub fn shutdown(&mut self) {
        self.grids.clear();
    }
}
