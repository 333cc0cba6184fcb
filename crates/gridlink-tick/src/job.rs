//! Background simulation jobs and their cross-thread submission path.
//!
//! Jobs may be registered from any thread through a [`JobSubmitter`].
//! Submissions travel over an unbounded crossbeam channel and are moved
//! into the owning world's session by the tick thread, so the per-tick
//! round-robin never contends with producers.

use crossbeam_channel::Sender;

use gridlink_core::WorldId;

/// A long-running computation advanced in bounded slices across ticks.
pub trait SimulationJob: Send {
    /// Advance by at most `budget_us` microseconds of work.
    ///
    /// Returns `true` while more work remains. A job returning `false`
    /// is dropped from the registry.
    fn advance(&mut self, budget_us: u64) -> bool;
}

/// A job paired with the world it belongs to.
pub(crate) type JobSubmission = (WorldId, Box<dyn SimulationJob>);

/// Cloneable, `Send` handle for registering jobs from any thread.
#[derive(Clone)]
pub struct JobSubmitter {
    tx: Sender<JobSubmission>,
}

impl JobSubmitter {
    pub(crate) fn new(tx: Sender<JobSubmission>) -> Self {
        Self { tx }
    }

    /// Register `job` against `world`.
    ///
    /// The job is picked up at the world's next tick end, or dropped then
    /// if the world is not loaded. Returns `false` when the scheduler has
    /// been dropped.
    pub fn submit(&self, world: WorldId, job: Box<dyn SimulationJob>) -> bool {
        self.tx.send((world, job)).is_ok()
    }
}

/// Equal share of `budget_us` for each of `jobs` active jobs, never
/// less than one time unit.
pub fn time_slice(budget_us: u64, jobs: usize) -> u64 {
    if jobs == 0 {
        return budget_us.max(1);
    }
    (budget_us / jobs as u64).max(1)
}
