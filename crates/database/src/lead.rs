//! Lead persistence.

use bot_core::{ChatId, Lead};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::LeadRecord;

/// Insert a lead and return its row ID.
pub async fn insert_lead(pool: &SqlitePool, lead: &Lead) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO leads (chat_id, purpose, bedrooms, payment, phone, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(lead.chat_id.0)
    .bind(&lead.purpose)
    .bind(&lead.bedroom_count)
    .bind(&lead.payment_method)
    .bind(&lead.phone)
    .bind(lead.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All leads of one chat, oldest first.
pub async fn list_leads_for_chat(pool: &SqlitePool, chat_id: ChatId) -> Result<Vec<LeadRecord>> {
    let rows = sqlx::query_as::<_, LeadRecord>(
        r#"
        SELECT id, chat_id, purpose, bedrooms, payment, phone, created_at
        FROM leads
        WHERE chat_id = ?
        ORDER BY id
        "#,
    )
    .bind(chat_id.0)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count stored leads.
pub async fn count_leads(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM leads
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
