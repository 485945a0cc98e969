//! Known chats.

use bot_core::ChatId;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;

/// Register a chat. Registering a known chat is a no-op.
pub async fn save_user(pool: &SqlitePool, chat_id: ChatId) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (chat_id, created_at)
        VALUES (?, ?)
        ON CONFLICT(chat_id) DO NOTHING
        "#,
    )
    .bind(chat_id.0)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// List all known chats in registration order.
pub async fn list_chat_ids(pool: &SqlitePool) -> Result<Vec<ChatId>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT chat_id FROM users
        ORDER BY created_at, chat_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().map(ChatId).collect())
}

/// Count known chats.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
