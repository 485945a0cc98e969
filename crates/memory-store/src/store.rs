//! In-memory implementations of the store traits.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bot_core::{
    BroadcastStat, BroadcastStatStore, ChatId, FunnelStore, Lead, LeadStore, State, StoreError,
    UserDirectory, DEFAULT_RECENT_STATS,
};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    users: Vec<ChatId>,
    leads: Vec<Lead>,
    hits: HashSet<(State, ChatId)>,
    stats: Vec<BroadcastStat>,
}

/// A store that keeps everything in memory.
///
/// Implements every store trait, so one instance can back a whole bot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with users already registered.
    pub fn with_users(users: impl IntoIterator<Item = ChatId>) -> Self {
        let mut inner = Inner::default();
        for id in users {
            if !inner.users.contains(&id) {
                inner.users.push(id);
            }
        }
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Leads saved so far, oldest first.
    pub async fn leads(&self) -> Vec<Lead> {
        self.inner.lock().await.leads.clone()
    }

    /// Broadcast stats saved so far, oldest first.
    pub async fn stats(&self) -> Vec<BroadcastStat> {
        self.inner.lock().await.stats.clone()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn save_user(&self, chat_id: ChatId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains(&chat_id) {
            inner.users.push(chat_id);
        }
        Ok(())
    }

    async fn list_chat_ids(&self) -> Result<Vec<ChatId>, StoreError> {
        Ok(self.inner.lock().await.users.clone())
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn save_lead(&self, lead: &Lead) -> Result<(), StoreError> {
        self.inner.lock().await.leads.push(lead.clone());
        Ok(())
    }
}

#[async_trait]
impl FunnelStore for MemoryStore {
    async fn hit(&self, state: State, chat_id: ChatId) -> Result<(), StoreError> {
        self.inner.lock().await.hits.insert((state, chat_id));
        Ok(())
    }

    async fn counts(&self) -> Result<HashMap<State, u64>, StoreError> {
        let inner = self.inner.lock().await;
        let mut counts = HashMap::new();
        for (state, _) in inner.hits.iter() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl BroadcastStatStore for MemoryStore {
    async fn save(&self, stat: &BroadcastStat) -> Result<(), StoreError> {
        self.inner.lock().await.stats.push(stat.clone());
        Ok(())
    }

    async fn list_recent(&self, n: usize) -> Result<Vec<BroadcastStat>, StoreError> {
        let n = if n == 0 { DEFAULT_RECENT_STATS } else { n };
        let inner = self.inner.lock().await;
        Ok(inner.stats.iter().rev().take(n).cloned().collect())
    }
}

/// A store whose every operation fails with [`StoreError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("failing store".to_string())
}

#[async_trait]
impl UserDirectory for FailingStore {
    async fn save_user(&self, _chat_id: ChatId) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn list_chat_ids(&self) -> Result<Vec<ChatId>, StoreError> {
        Err(unavailable())
    }
}

#[async_trait]
impl LeadStore for FailingStore {
    async fn save_lead(&self, _lead: &Lead) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

#[async_trait]
impl FunnelStore for FailingStore {
    async fn hit(&self, _state: State, _chat_id: ChatId) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn counts(&self) -> Result<HashMap<State, u64>, StoreError> {
        Err(unavailable())
    }
}

#[async_trait]
impl BroadcastStatStore for FailingStore {
    async fn save(&self, _stat: &BroadcastStat) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn list_recent(&self, _n: usize) -> Result<Vec<BroadcastStat>, StoreError> {
        Err(unavailable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_user_is_idempotent() {
        let store = MemoryStore::new();
        store.save_user(ChatId(1)).await.unwrap();
        store.save_user(ChatId(1)).await.unwrap();
        store.save_user(ChatId(2)).await.unwrap();

        assert_eq!(
            store.list_chat_ids().await.unwrap(),
            vec![ChatId(1), ChatId(2)]
        );
    }

    #[tokio::test]
    async fn test_hits_count_distinct_chats() {
        let store = MemoryStore::new();
        store.hit(State::Intro, ChatId(1)).await.unwrap();
        store.hit(State::Intro, ChatId(1)).await.unwrap();
        store.hit(State::Intro, ChatId(2)).await.unwrap();
        store.hit(State::Purpose, ChatId(1)).await.unwrap();

        let counts = store.counts().await.unwrap();
        assert_eq!(counts[&State::Intro], 2);
        assert_eq!(counts[&State::Purpose], 1);
        assert!(!counts.contains_key(&State::LeadSaved));
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = MemoryStore::new();
        for total in 1..=3 {
            store
                .save(&BroadcastStat {
                    total,
                    sent: total,
                    failed: 0,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let recent = store.list_recent(2).await.unwrap();
        let totals: Vec<u32> = recent.iter().map(|s| s.total).collect();
        assert_eq!(totals, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_list_recent_zero_uses_default() {
        let store = MemoryStore::new();
        for total in 1..=12 {
            store
                .save(&BroadcastStat {
                    total,
                    sent: total,
                    failed: 0,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let recent = store.list_recent(0).await.unwrap();
        assert_eq!(recent.len(), DEFAULT_RECENT_STATS);
        assert_eq!(recent[0].total, 12);
    }

    #[tokio::test]
    async fn test_failing_store() {
        assert!(FailingStore.list_chat_ids().await.is_err());
        assert!(FailingStore.counts().await.is_err());
    }
}
