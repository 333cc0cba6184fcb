//! Per-phase reports and cumulative scheduler counters.

use std::time::Duration;

/// Outcome of draining one deferred-callable queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Callables that completed successfully.
    pub executed: usize,
    /// Callables that returned an error or panicked.
    pub failed: usize,
    /// Callables left queued for the next occurrence of the phase.
    pub remaining: usize,
    /// Wall-clock time spent draining.
    pub elapsed: Duration,
}

/// Outcome of advancing one world's simulation jobs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobSliceReport {
    /// Jobs advanced this tick.
    pub jobs: usize,
    /// Time units handed to each job.
    pub slice_us: u64,
    /// Jobs that reported no remaining work and were dropped.
    pub completed: usize,
}

/// Outcome of the server-tick-end phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerTickReport {
    /// Grids whose update hook ran.
    pub grids_updated: usize,
    /// Server-side color entries evicted.
    pub colors_evicted: usize,
    /// Drain of the global callable queue.
    pub drain: DrainReport,
}

/// Cumulative counters since the scheduler was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerMetrics {
    /// Callables that completed successfully.
    pub callables_executed: u64,
    /// Callables that failed or panicked.
    pub callables_failed: u64,
    /// Drains that stopped early on budget.
    pub budget_exhaustions: u64,
    /// Job slices handed out.
    pub job_slices: u64,
    /// Jobs that finished.
    pub jobs_completed: u64,
    /// Grid update hooks invoked.
    pub grid_updates: u64,
    /// Visual refreshes triggered by render-mode changes.
    pub visual_refreshes: u64,
    /// Callables and jobs dropped because their world was not loaded.
    pub work_dropped: u64,
}

impl SchedulerMetrics {
    pub(crate) fn record_drain(&mut self, report: &DrainReport) {
        self.callables_executed += report.executed as u64;
        self.callables_failed += report.failed as u64;
        if report.remaining > 0 {
            self.budget_exhaustions += 1;
        }
    }
}
