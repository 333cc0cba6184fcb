//! Reusable simulation job fixtures.
//!
//! - [`ScriptedJob`]: finishes after a fixed number of slices and records
//!   every slice it was handed.
//! - [`CountingJob`]: never finishes; counts how often it ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gridlink_tick::SimulationJob;

/// Runs for `steps` slices, then reports completion.
///
/// The slices handed to it are shared through [`slices`](Self::slices)
/// so a test can keep a handle after boxing the job.
pub struct ScriptedJob {
    steps: usize,
    slices: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedJob {
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            slices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of every slice this job received.
    pub fn slices(&self) -> Arc<Mutex<Vec<u64>>> {
        Arc::clone(&self.slices)
    }
}

impl SimulationJob for ScriptedJob {
    fn advance(&mut self, budget_us: u64) -> bool {
        self.slices.lock().unwrap().push(budget_us);
        self.steps = self.steps.saturating_sub(1);
        self.steps > 0
    }
}

/// Never finishes.
#[derive(Default)]
pub struct CountingJob {
    runs: Arc<AtomicUsize>,
}

impl CountingJob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }
}

impl SimulationJob for CountingJob {
    fn advance(&mut self, _budget_us: u64) -> bool {
        self.runs.fetch_add(1, Ordering::SeqCst);
        true
    }
}
