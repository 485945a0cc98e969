//! Broadcast outcome history.

use bot_core::BroadcastStat;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::BroadcastStatRecord;

/// Limit used when the caller asks for zero rows.
pub const DEFAULT_RECENT_LIMIT: usize = bot_core::DEFAULT_RECENT_STATS;

/// Append a broadcast outcome.
pub async fn insert_stat(pool: &SqlitePool, stat: &BroadcastStat) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO broadcast_stats (total, sent, failed, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(i64::from(stat.total))
    .bind(i64::from(stat.sent))
    .bind(i64::from(stat.failed))
    .bind(stat.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// The most recent outcomes, newest first.
pub async fn list_recent(pool: &SqlitePool, limit: usize) -> Result<Vec<BroadcastStatRecord>> {
    let limit = if limit == 0 { DEFAULT_RECENT_LIMIT } else { limit };
    let rows = sqlx::query_as::<_, BroadcastStatRecord>(
        r#"
        SELECT id, total, sent, failed, created_at
        FROM broadcast_stats
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
