//! Telegram transport built on teloxide.

mod listener;
mod sender;

pub use sender::TelegramSender;

use bot_core::InboundEvent;
use teloxide::prelude::*;
use teloxide::RequestError;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Errors setting up the Telegram transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("bot token is empty")]
    EmptyToken,

    #[error("Telegram API request failed: {0}")]
    Request(#[from] RequestError),
}

/// A verified bot connection.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Create the bot and verify the token with `getMe`.
    pub async fn connect(token: &str) -> Result<Self, TransportError> {
        if token.trim().is_empty() {
            return Err(TransportError::EmptyToken);
        }

        let bot = Bot::new(token.trim());
        let me = bot.get_me().await?;
        info!(username = ?me.user.username, "Connected to Telegram");

        Ok(Self { bot })
    }

    pub fn sender(&self) -> TelegramSender {
        TelegramSender::new(self.bot.clone())
    }

    /// Start long polling; events arrive on the returned receiver.
    pub fn listen(&self, buffer: usize) -> (mpsc::Receiver<InboundEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        let handle = listener::spawn(self.bot.clone(), tx);
        (rx, handle)
    }
}
