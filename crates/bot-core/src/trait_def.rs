//! Collaborator traits consumed by the core components.
//!
//! All traits are object-safe and used as `Arc<dyn Trait>`.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{DeliveryError, SendError, StoreError};
use crate::message::Prompt;
use crate::model::{BroadcastStat, ChatId, Lead, State};

/// Registry of every chat that has talked to the bot.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Remember a chat. Saving an already known chat is a no-op.
    async fn save_user(&self, chat_id: ChatId) -> Result<(), StoreError>;

    /// List every known chat.
    async fn list_chat_ids(&self) -> Result<Vec<ChatId>, StoreError>;
}

/// Persistent storage for captured leads.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save_lead(&self, lead: &Lead) -> Result<(), StoreError>;
}

/// Storage of funnel reach-events.
#[async_trait]
pub trait FunnelStore: Send + Sync {
    /// Record that `chat_id` reached `state`. Repeats must not change counts.
    async fn hit(&self, state: State, chat_id: ChatId) -> Result<(), StoreError>;

    /// Distinct chat counts per state, for states with at least one hit.
    async fn counts(&self) -> Result<HashMap<State, u64>, StoreError>;
}

/// Row count used by [`BroadcastStatStore::list_recent`] when asked for zero.
pub const DEFAULT_RECENT_STATS: usize = 10;

/// Append-only storage of broadcast outcomes.
#[async_trait]
pub trait BroadcastStatStore: Send + Sync {
    async fn save(&self, stat: &BroadcastStat) -> Result<(), StoreError>;

    /// The `n` most recent stats, newest first. `n == 0` means
    /// [`DEFAULT_RECENT_STATS`].
    async fn list_recent(&self, n: usize) -> Result<Vec<BroadcastStat>, StoreError>;
}

/// External destination for completed leads (CRM, webhooks and similar).
#[async_trait]
pub trait LeadDelivery: Send + Sync {
    async fn send_lead(&self, lead: &Lead) -> Result<(), DeliveryError>;
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError>;

    /// Send a photo referenced by a transport file identifier.
    async fn send_photo(&self, chat_id: ChatId, photo: &str, caption: &str)
        -> Result<(), SendError>;

    /// Send a prompt with its keyboard.
    ///
    /// Default implementation ignores the keyboard and calls `send_text`.
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), SendError> {
        self.send_text(chat_id, &prompt.text).await
    }

    /// Render and send a bar chart built from parallel labels and values.
    ///
    /// Default implementation reports the capability as unsupported so the
    /// caller can fall back to text.
    async fn send_chart(
        &self,
        chat_id: ChatId,
        labels: &[String],
        values: &[u64],
    ) -> Result<(), SendError> {
        let _ = (chat_id, labels, values);
        Err(SendError::Unsupported("charts"))
    }
}
