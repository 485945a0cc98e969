//! Application state shared across HTTP handlers.

use database::Database;
use funnel::FunnelAnalytics;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Funnel analytics over the same database.
    pub funnel: FunnelAnalytics,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, funnel: FunnelAnalytics) -> Self {
        Self { db, funnel }
    }
}
