//! Capacity-bounded LRU table of per-chat sessions.

use std::time::Duration;

use bot_core::ChatId;
use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
struct Slot<S> {
    value: S,
    touched: Instant,
}

/// Per-chat values ordered from least to most recently touched.
///
/// Inserting past capacity evicts the least recently touched chat.
#[derive(Debug)]
pub struct SessionTable<S> {
    entries: IndexMap<ChatId, Slot<S>>,
    capacity: usize,
}

impl<S: Default> SessionTable<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Get the value for a chat, creating it if missing, and mark it used.
    pub fn touch(&mut self, chat_id: ChatId) -> &mut S {
        let now = Instant::now();

        // Move to end (LRU behavior)
        let mut slot = self.entries.shift_remove(&chat_id).unwrap_or_else(|| Slot {
            value: S::default(),
            touched: now,
        });
        slot.touched = now;

        while self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                debug!(chat_id = %evicted, "Evicted least recently used session");
            }
        }

        &mut self.entries.entry(chat_id).or_insert(slot).value
    }

    /// Look up a chat without changing its recency.
    pub fn get(&self, chat_id: ChatId) -> Option<&S> {
        self.entries.get(&chat_id).map(|slot| &slot.value)
    }

    /// Mutable lookup without changing recency.
    pub fn get_mut(&mut self, chat_id: ChatId) -> Option<&mut S> {
        self.entries.get_mut(&chat_id).map(|slot| &mut slot.value)
    }

    pub fn remove(&mut self, chat_id: ChatId) -> Option<S> {
        self.entries.shift_remove(&chat_id).map(|slot| slot.value)
    }

    /// Drop every session untouched for at least `idle`. Returns how many went.
    pub fn sweep_idle(&mut self, idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, slot| now.duration_since(slot.touched) < idle);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
