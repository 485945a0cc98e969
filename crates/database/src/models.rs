//! Database models.

use bot_core::{BroadcastStat, ChatId, Lead};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LeadRecord {
    /// Auto-incrementing ID.
    pub id: i64,
    pub chat_id: i64,
    pub purpose: String,
    pub bedrooms: String,
    pub payment: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl From<LeadRecord> for Lead {
    fn from(record: LeadRecord) -> Self {
        Lead {
            chat_id: ChatId(record.chat_id),
            purpose: record.purpose,
            bedroom_count: record.bedrooms,
            payment_method: record.payment,
            phone: record.phone,
            created_at: record.created_at,
        }
    }
}

/// A stored broadcast outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BroadcastStatRecord {
    /// Auto-incrementing ID.
    pub id: i64,
    pub total: i64,
    pub sent: i64,
    pub failed: i64,
    pub created_at: DateTime<Utc>,
}

impl From<BroadcastStatRecord> for BroadcastStat {
    fn from(record: BroadcastStatRecord) -> Self {
        BroadcastStat {
            total: to_u32(record.total),
            sent: to_u32(record.sent),
            failed: to_u32(record.failed),
            created_at: record.created_at,
        }
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}
