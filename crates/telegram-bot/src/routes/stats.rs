//! JSON views over funnel and broadcast data.

use axum::extract::{Query, State};
use axum::Json;
use bot_core::BroadcastStat;
use funnel::{ChartSeries, FunnelRow};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

/// Headline counters.
#[derive(Debug, Serialize)]
pub struct Stats {
    pub user_count: i64,
    pub lead_count: i64,
}

/// Funnel chart series plus the conversion rows.
#[derive(Debug, Serialize)]
pub struct FunnelView {
    pub series: ChartSeries,
    /// Empty until at least one milestone is reached.
    pub rows: Vec<FunnelRow>,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastsQuery {
    /// Number of rows; `0` or absent uses the store default.
    #[serde(default)]
    pub limit: usize,
}

pub async fn stats_api(State(state): State<AppState>) -> Result<Json<Stats>> {
    let pool = state.db.pool();

    let user_count = database::user::count_users(pool).await?;
    let lead_count = database::lead::count_leads(pool).await?;

    Ok(Json(Stats {
        user_count,
        lead_count,
    }))
}

pub async fn funnel_api(State(state): State<AppState>) -> Json<FunnelView> {
    let series = state.funnel.chart_series().await;
    let rows = state
        .funnel
        .report()
        .await
        .map(|report| report.rows().to_vec())
        .unwrap_or_default();

    Json(FunnelView { series, rows })
}

pub async fn broadcasts_api(
    State(state): State<AppState>,
    Query(query): Query<BroadcastsQuery>,
) -> Result<Json<Vec<BroadcastStat>>> {
    let records = database::broadcast_stat::list_recent(state.db.pool(), query.limit).await?;
    Ok(Json(records.into_iter().map(BroadcastStat::from).collect()))
}
