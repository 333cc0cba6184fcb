//! Session configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use gridlink_graph::NetworkConfig;
use gridlink_tick::{ConfigError as SchedulerConfigError, SchedulerConfig};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Scheduler budgets are invalid.
    Scheduler(SchedulerConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scheduler(e) => Some(e),
        }
    }
}

impl From<SchedulerConfigError> for ConfigError {
    fn from(e: SchedulerConfigError) -> Self {
        Self::Scheduler(e)
    }
}

// ── SessionConfig ──────────────────────────────────────────────────

/// Complete configuration for constructing a [`Session`](crate::Session).
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    /// Network-wide settings such as the channel mode.
    pub network: NetworkConfig,
    /// Per-phase work budgets.
    pub scheduler: SchedulerConfig,
}

impl SessionConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate()?;
        Ok(())
    }
}
