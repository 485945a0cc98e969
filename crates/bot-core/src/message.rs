//! Transport-neutral inbound and outbound message types.

use crate::model::ChatId;

/// What an inbound event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Typed text or a pressed option button.
    Text(String),
    /// A shared contact card.
    Contact { phone: String },
    /// A photo, referenced by the transport's file identifier.
    Photo { file_id: String, caption: String },
}

/// A single inbound event from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub payload: Payload,
}

impl InboundEvent {
    /// Create a text event.
    pub fn text(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            payload: Payload::Text(text.into()),
        }
    }

    /// Create a contact event.
    pub fn contact(chat_id: impl Into<ChatId>, phone: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            payload: Payload::Contact {
                phone: phone.into(),
            },
        }
    }

    /// Create a photo event.
    pub fn photo(
        chat_id: impl Into<ChatId>,
        file_id: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            payload: Payload::Photo {
                file_id: file_id.into(),
                caption: caption.into(),
            },
        }
    }

    /// The text of the event, or an empty string for non-text payloads.
    pub fn text_or_empty(&self) -> &str {
        match &self.payload {
            Payload::Text(text) => text,
            _ => "",
        }
    }
}

/// Keyboard attached to an outbound prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the client shows.
    #[default]
    Keep,
    /// One button per option; pressing it sends the option text back.
    Options(Vec<String>),
    /// Hide the custom keyboard.
    Remove,
    /// A single button asking the user to share their phone contact.
    RequestContact(String),
}

/// An outbound text message with an optional keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Prompt {
    /// Plain text, keyboard untouched.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Keep,
        }
    }

    /// Text with option buttons. An empty option list leaves the keyboard alone.
    pub fn with_options(text: impl Into<String>, options: Vec<String>) -> Self {
        let keyboard = if options.is_empty() {
            Keyboard::Keep
        } else {
            Keyboard::Options(options)
        };
        Self {
            text: text.into(),
            keyboard,
        }
    }

    /// Text that also hides the custom keyboard.
    pub fn removing_keyboard(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Remove,
        }
    }
}
