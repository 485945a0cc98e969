//! Funnel reach-events.

use std::collections::HashMap;

use bot_core::{ChatId, State};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::Result;

/// Record that a chat reached a state. Repeats are ignored.
pub async fn record_hit(pool: &SqlitePool, state: State, chat_id: ChatId) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO funnel_hits (chat_id, state, created_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(chat_id.0)
    .bind(state.as_str())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Distinct chat counts per state.
///
/// Rows with an unknown state name are skipped.
pub async fn count_by_state(pool: &SqlitePool) -> Result<HashMap<State, u64>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT state, COUNT(DISTINCT chat_id) AS count
        FROM funnel_hits
        GROUP BY state
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut counts = HashMap::with_capacity(rows.len());
    for (name, count) in rows {
        match name.parse::<State>() {
            Ok(state) => {
                counts.insert(state, u64::try_from(count).unwrap_or(0));
            }
            Err(e) => warn!(error = %e, "Skipping funnel row"),
        }
    }
    Ok(counts)
}
