//! Scheduler configuration, validation, and error types.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Budgets that bound the work done per tick phase.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Wall-clock budget for draining a deferred-callable queue. Once a
    /// drain has run longer than this, no further callable is started
    /// until the next occurrence of the phase. Default: 50 ms.
    pub callable_budget: Duration,
    /// Total computation time, in milliseconds, shared by all simulation
    /// jobs of one world per tick. Default: 5.
    pub job_time_per_tick_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            callable_budget: Duration::from_millis(50),
            job_time_per_tick_ms: 5,
        }
    }
}

impl SchedulerConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.callable_budget.is_zero() {
            return Err(ConfigError::ZeroCallableBudget);
        }
        if self.job_time_per_tick_ms == 0 {
            return Err(ConfigError::ZeroJobBudget);
        }
        if self.job_time_per_tick_ms > u64::MAX / 1000 {
            return Err(ConfigError::JobBudgetOverflow {
                value: self.job_time_per_tick_ms,
            });
        }
        Ok(())
    }

    /// Per-world job budget in microseconds.
    pub fn job_budget_us(&self) -> u64 {
        self.job_time_per_tick_ms * 1000
    }
}

/// Errors detected during [`SchedulerConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `callable_budget` is zero; no callable would ever run twice.
    ZeroCallableBudget,
    /// `job_time_per_tick_ms` is zero.
    ZeroJobBudget,
    /// `job_time_per_tick_ms` does not fit in microseconds.
    JobBudgetOverflow {
        /// The configured value.
        value: u64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCallableBudget => write!(f, "callable_budget must be non-zero"),
            Self::ZeroJobBudget => write!(f, "job_time_per_tick_ms must be at least 1"),
            Self::JobBudgetOverflow { value } => {
                write!(f, "job_time_per_tick_ms {value} overflows microseconds")
            }
        }
    }
}

impl Error for ConfigError {}
