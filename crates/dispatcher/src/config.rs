//! Dispatcher tuning.

use std::time::Duration;

/// Default delay before a captured lead's session is reset.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(120);

/// Default idle time after which a session is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Delay between lead capture and session reset.
    pub reset_delay: Duration,

    /// Sessions untouched this long are dropped by the idle sweep.
    pub idle_timeout: Duration,

    /// How often the idle sweep runs.
    pub sweep_interval: Duration,

    /// Maximum number of visitor sessions kept in memory.
    pub max_sessions: usize,

    /// Number of broadcasts listed by the stats command.
    pub stats_rows: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            reset_delay: DEFAULT_RESET_DELAY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_interval: Duration::from_secs(60),
            max_sessions: 10_000,
            stats_rows: 5,
        }
    }
}
