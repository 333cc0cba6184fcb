//! Per-world scheduler state.

use std::time::Duration;

use gridlink_core::WorldId;

use crate::callable::{CallQueue, Callable};
use crate::job::{time_slice, SimulationJob};
use crate::metrics::{DrainReport, JobSliceReport};

/// Deferred callables and simulation jobs owned by one loaded world.
///
/// Dropping the session drops everything still queued without running
/// it.
#[derive(Default)]
pub struct WorldSession {
    queue: CallQueue,
    jobs: Vec<Box<dyn SimulationJob>>,
}

impl WorldSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a callable for the world's next tick start.
    pub fn push_callable(&mut self, callable: Callable) {
        self.queue.push(callable);
    }

    /// Register a job to be advanced at each world tick end.
    pub fn push_job(&mut self, job: Box<dyn SimulationJob>) {
        self.jobs.push(job);
    }

    /// Callables waiting to run.
    pub fn pending_callables(&self) -> usize {
        self.queue.len()
    }

    /// Jobs still reporting work.
    pub fn active_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Drain the world's callable queue under `budget`.
    pub fn drain(&mut self, world: WorldId, budget: Duration) -> DrainReport {
        self.queue.drain(Some(world), budget)
    }

    /// Advance every job by an equal share of `budget_us` and drop the
    /// ones that finished.
    pub fn advance_jobs(&mut self, budget_us: u64) -> JobSliceReport {
        if self.jobs.is_empty() {
            return JobSliceReport::default();
        }
        let jobs = self.jobs.len();
        let slice_us = time_slice(budget_us, jobs);
        self.jobs.retain_mut(|job| job.advance(slice_us));
        JobSliceReport {
            jobs,
            slice_us,
            completed: jobs - self.jobs.len(),
        }
    }
}
