//! Deferred one-shot callables and the time-boxed FIFO queue that runs them.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use gridlink_core::{CallableError, WorldId};

use crate::metrics::DrainReport;

/// A unit of deferred work.
///
/// Receives the world it was queued against (`None` for the global
/// queue). Runs at most once.
pub type Callable = Box<dyn FnOnce(Option<WorldId>) -> Result<(), CallableError> + Send>;

/// FIFO queue of [`Callable`]s.
#[derive(Default)]
pub struct CallQueue {
    queue: VecDeque<Callable>,
}

impl CallQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callable.
    pub fn push(&mut self, callable: Callable) {
        self.queue.push_back(callable);
    }

    /// Number of queued callables.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run queued callables in FIFO order until the queue is empty or
    /// `budget` has elapsed.
    ///
    /// The budget is checked after each callable, so a single slow
    /// callable may overrun it; the drain only refuses to start more
    /// work. Failures and panics are logged and counted, and the drain
    /// continues with the next entry.
    pub fn drain(&mut self, context: Option<WorldId>, budget: Duration) -> DrainReport {
        let start = Instant::now();
        let mut report = DrainReport::default();

        while let Some(call) = self.queue.pop_front() {
            match catch_unwind(AssertUnwindSafe(|| call(context))) {
                Ok(Ok(())) => report.executed += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    log::debug!("queue processing error: {e}");
                }
                Err(payload) => {
                    report.failed += 1;
                    log::debug!("queue processing error: {}", panic_message(&*payload));
                }
            }

            if start.elapsed() > budget {
                break;
            }
        }

        report.remaining = self.queue.len();
        report.elapsed = start.elapsed();
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "callable panicked"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<u32>>>, tag: u32) -> Callable {
        let log = Arc::clone(log);
        Box::new(move |_| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    #[test]
    fn runs_in_fifo_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut q = CallQueue::new();
        for tag in 0..4 {
            q.push(recorder(&log, tag));
        }
        let report = q.drain(None, Duration::from_secs(5));
        assert_eq!(report.executed, 4);
        assert_eq!(report.remaining, 0);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn passes_world_context() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut q = CallQueue::new();
        q.push(Box::new(move |w| {
            *sink.lock().unwrap() = w;
            Ok(())
        }));
        q.drain(Some(WorldId(7)), Duration::from_secs(5));
        assert_eq!(*seen.lock().unwrap(), Some(WorldId(7)));
    }

    #[test]
    fn failures_do_not_stop_the_drain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut q = CallQueue::new();
        q.push(recorder(&log, 1));
        q.push(Box::new(|_| Err(CallableError::new("nope"))));
        q.push(Box::new(|_| panic!("boom")));
        q.push(recorder(&log, 2));

        let report = q.drain(None, Duration::from_secs(5));
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn stops_after_budget_exceeded() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut q = CallQueue::new();
        q.push(Box::new(|_| {
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        }));
        q.push(recorder(&log, 1));
        q.push(recorder(&log, 2));

        let report = q.drain(None, Duration::from_millis(5));
        assert_eq!(report.executed, 1);
        assert_eq!(report.remaining, 2);
        assert!(log.lock().unwrap().is_empty());

        // The remainder runs on the next drain.
        let report = q.drain(None, Duration::from_secs(5));
        assert_eq!(report.executed, 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }
}
