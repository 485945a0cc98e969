//! Outbound messages through the Bot API.

use bot_core::{async_trait, ChatId, Keyboard, MessageSender, Prompt, SendError};
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, FileId, InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup,
};
use teloxide::RequestError;
use tracing::debug;

/// [`MessageSender`] backed by a teloxide [`Bot`].
///
/// Charts are not rendered here; the default `send_chart` reports them as
/// unsupported and callers fall back to text.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(teloxide_chat(chat_id), text)
            .await
            .map_err(rejected)?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        photo: &str,
        caption: &str,
    ) -> Result<(), SendError> {
        let request = self
            .bot
            .send_photo(teloxide_chat(chat_id), InputFile::file_id(FileId(photo.to_string())));
        let result = if caption.is_empty() {
            request.await
        } else {
            request.caption(caption).await
        };
        result.map_err(rejected)?;
        Ok(())
    }

    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), SendError> {
        let request = self.bot.send_message(teloxide_chat(chat_id), &prompt.text);
        let result = match reply_markup(&prompt.keyboard) {
            Some(markup) => request.reply_markup(markup).await,
            None => request.await,
        };
        result.map_err(rejected)?;
        Ok(())
    }
}

/// Telegram markup for a prompt keyboard. `None` leaves the client keyboard
/// untouched.
fn reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Keep => None,
        Keyboard::Options(options) => {
            let rows = options
                .iter()
                .map(|option| vec![KeyboardButton::new(option.clone())]);
            Some(ReplyMarkup::Keyboard(
                KeyboardMarkup::new(rows).resize_keyboard(),
            ))
        }
        Keyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        Keyboard::RequestContact(label) => {
            let button = KeyboardButton::new(label.clone()).request(ButtonRequest::Contact);
            Some(ReplyMarkup::Keyboard(
                KeyboardMarkup::new(vec![vec![button]])
                    .resize_keyboard()
                    .one_time_keyboard(),
            ))
        }
    }
}

fn teloxide_chat(chat_id: ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat_id.0)
}

fn rejected(err: RequestError) -> SendError {
    debug!(error = %err, "Telegram request failed");
    SendError::Rejected(err.to_string())
}
