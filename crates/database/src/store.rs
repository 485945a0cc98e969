//! Store trait implementations backed by [`Database`].

use std::collections::HashMap;

use async_trait::async_trait;
use bot_core::{
    BroadcastStat, BroadcastStatStore, ChatId, FunnelStore, Lead, LeadStore, State, StoreError,
    UserDirectory,
};

use crate::{broadcast_stat, funnel_hit, lead, user, Database};

#[async_trait]
impl UserDirectory for Database {
    async fn save_user(&self, chat_id: ChatId) -> Result<(), StoreError> {
        Ok(user::save_user(self.pool(), chat_id).await?)
    }

    async fn list_chat_ids(&self) -> Result<Vec<ChatId>, StoreError> {
        Ok(user::list_chat_ids(self.pool()).await?)
    }
}

#[async_trait]
impl LeadStore for Database {
    async fn save_lead(&self, record: &Lead) -> Result<(), StoreError> {
        lead::insert_lead(self.pool(), record).await?;
        Ok(())
    }
}

#[async_trait]
impl FunnelStore for Database {
    async fn hit(&self, state: State, chat_id: ChatId) -> Result<(), StoreError> {
        Ok(funnel_hit::record_hit(self.pool(), state, chat_id).await?)
    }

    async fn counts(&self) -> Result<HashMap<State, u64>, StoreError> {
        Ok(funnel_hit::count_by_state(self.pool()).await?)
    }
}

#[async_trait]
impl BroadcastStatStore for Database {
    async fn save(&self, stat: &BroadcastStat) -> Result<(), StoreError> {
        broadcast_stat::insert_stat(self.pool(), stat).await?;
        Ok(())
    }

    async fn list_recent(&self, n: usize) -> Result<Vec<BroadcastStat>, StoreError> {
        let rows = broadcast_stat::list_recent(self.pool(), n).await?;
        Ok(rows.into_iter().map(BroadcastStat::from).collect())
    }
}
