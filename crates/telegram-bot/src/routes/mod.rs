//! HTTP routes served next to the bot.

pub mod health;
pub mod stats;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/stats", get(stats::stats_api))
        .route("/api/funnel", get(stats::funnel_api))
        .route("/api/broadcasts", get(stats::broadcasts_api))
}
