//! A message sender that records everything it is asked to send.

use std::collections::HashSet;

use async_trait::async_trait;
use bot_core::{ChatId, MessageSender, Prompt, SendError};
use tokio::sync::Mutex;

/// One recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
    },
    Prompt {
        chat_id: ChatId,
        prompt: Prompt,
    },
    Photo {
        chat_id: ChatId,
        photo: String,
        caption: String,
    },
    Chart {
        chat_id: ChatId,
        labels: Vec<String>,
        values: Vec<u64>,
    },
}

impl Sent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Sent::Text { chat_id, .. }
            | Sent::Prompt { chat_id, .. }
            | Sent::Photo { chat_id, .. }
            | Sent::Chart { chat_id, .. } => *chat_id,
        }
    }

    /// The visible text, if the message has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } => Some(text),
            Sent::Prompt { prompt, .. } => Some(&prompt.text),
            Sent::Photo { caption, .. } => Some(caption),
            Sent::Chart { .. } => None,
        }
    }
}

/// Records sent messages; optionally fails for chosen recipients.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    failing: HashSet<ChatId>,
    charts: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send to the given chats.
    pub fn failing_for(mut self, chats: impl IntoIterator<Item = ChatId>) -> Self {
        self.failing.extend(chats);
        self
    }

    /// Accept chart sends instead of reporting them unsupported.
    pub fn with_charts(mut self) -> Self {
        self.charts = true;
        self
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    /// Visible texts sent to one chat, in order.
    pub async fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| s.chat_id() == chat_id)
            .filter_map(|s| s.text().map(str::to_string))
            .collect()
    }

    /// The last message sent to one chat.
    pub async fn last_to(&self, chat_id: ChatId) -> Option<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|s| s.chat_id() == chat_id)
            .cloned()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }

    async fn record(&self, sent: Sent) -> Result<(), SendError> {
        if self.failing.contains(&sent.chat_id()) {
            return Err(SendError::Rejected(format!("chat {} blocked", sent.chat_id())));
        }
        self.sent.lock().await.push(sent);
        Ok(())
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        self.record(Sent::Text {
            chat_id,
            text: text.to_string(),
        })
        .await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
    ) -> Result<(), SendError> {
        self.record(Sent::Photo {
            chat_id,
            photo: photo.to_string(),
            caption: caption.to_string(),
        })
        .await
    }

    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), SendError> {
        self.record(Sent::Prompt {
            chat_id,
            prompt: prompt.clone(),
        })
        .await
    }

    async fn send_chart(
        &self,
        chat_id: ChatId,
        labels: &[String],
        values: &[u64],
    ) -> Result<(), SendError> {
        if !self.charts {
            return Err(SendError::Unsupported("charts"));
        }
        self.record(Sent::Chart {
            chat_id,
            labels: labels.to_vec(),
            values: values.to_vec(),
        })
        .await
    }
}
