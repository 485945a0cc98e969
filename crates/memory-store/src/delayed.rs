//! Delayed sender - wraps another sender with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use bot_core::{ChatId, MessageSender, Prompt, SendError};
use tokio::time::sleep;

/// A sender that wraps another sender and adds artificial delay.
///
/// Useful for testing send timeouts.
pub struct DelayedSender<S: MessageSender> {
    inner: S,
    delay: Duration,
}

impl<S: MessageSender> DelayedSender<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn with_secs(inner: S, secs: u64) -> Self {
        Self::new(inner, Duration::from_secs(secs))
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: MessageSender> MessageSender for DelayedSender<S> {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        sleep(self.delay).await;
        self.inner.send_text(chat_id, text).await
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
    ) -> Result<(), SendError> {
        sleep(self.delay).await;
        self.inner.send_photo(chat_id, photo, caption).await
    }

    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), SendError> {
        sleep(self.delay).await;
        self.inner.send_prompt(chat_id, prompt).await
    }
}
