//! Per-chat qualification progress and the dialog's reply type.

use bot_core::{ChatId, Keyboard, Lead, Prompt, State};
use chrono::{DateTime, Utc};

/// Mutable qualification progress of one chat.
///
/// `phone` is only ever set once `state` reached [`State::RequestPhone`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub state: State,
    pub purpose: Option<String>,
    pub bedroom_count: Option<String>,
    pub payment_method: Option<String>,
    pub phone: Option<String>,
}

impl Session {
    /// Build the lead record for this session, if a phone was captured.
    pub fn to_lead(&self, chat_id: ChatId, created_at: DateTime<Utc>) -> Option<Lead> {
        let phone = self.phone.clone()?;
        Some(Lead {
            chat_id,
            purpose: self.purpose.clone().unwrap_or_default(),
            bedroom_count: self.bedroom_count.clone().unwrap_or_default(),
            payment_method: self.payment_method.clone().unwrap_or_default(),
            phone,
            created_at,
        })
    }
}

/// What the dialog wants sent back after handling one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Extra message sent before `text` (offers, intro notice).
    pub preface: Option<String>,
    pub text: String,
    pub options: Vec<String>,
    /// Set when the input moved the session to a new state.
    pub advance_to: Option<State>,
    pub remove_keyboard: bool,
    /// Label of a share-contact button to show instead of options.
    pub request_contact: Option<String>,
    /// The phone was captured by this input; lead side effects are due.
    pub lead_captured: bool,
}

impl Reply {
    pub(crate) fn ask(text: &str, options: &[String], advance_to: State) -> Self {
        Self {
            text: text.to_string(),
            options: options.to_vec(),
            advance_to: Some(advance_to),
            ..Default::default()
        }
    }

    pub(crate) fn reprompt(text: &str, options: &[String]) -> Self {
        Self {
            text: text.to_string(),
            options: options.to_vec(),
            ..Default::default()
        }
    }

    /// The main message as a transport prompt.
    pub fn prompt(&self) -> Prompt {
        let keyboard = if let Some(label) = &self.request_contact {
            Keyboard::RequestContact(label.clone())
        } else if self.remove_keyboard {
            Keyboard::Remove
        } else if self.options.is_empty() {
            Keyboard::Keep
        } else {
            Keyboard::Options(self.options.clone())
        };
        Prompt {
            text: self.text.clone(),
            keyboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lead_requires_phone() {
        let session = Session {
            state: State::RequestPhone,
            purpose: Some("Для себя".to_string()),
            ..Default::default()
        };
        assert!(session.to_lead(ChatId(1), Utc::now()).is_none());
    }

    #[test]
    fn test_to_lead_copies_fields() {
        let session = Session {
            state: State::LeadSaved,
            purpose: Some("Для себя".to_string()),
            bedroom_count: Some("2 спальни".to_string()),
            payment_method: Some("Ипотека".to_string()),
            phone: Some("+79991234567".to_string()),
        };
        let lead = session.to_lead(ChatId(5), Utc::now()).unwrap();
        assert_eq!(lead.chat_id, ChatId(5));
        assert_eq!(lead.bedroom_count, "2 спальни");
        assert_eq!(lead.payment_method, "Ипотека");
        assert_eq!(lead.phone, "+79991234567");
    }

    #[test]
    fn test_prompt_keyboard_precedence() {
        let reply = Reply {
            text: "phone?".to_string(),
            options: vec!["a".to_string()],
            request_contact: Some("Share".to_string()),
            ..Default::default()
        };
        assert_eq!(
            reply.prompt().keyboard,
            Keyboard::RequestContact("Share".to_string())
        );

        let reply = Reply {
            text: "bye".to_string(),
            remove_keyboard: true,
            ..Default::default()
        };
        assert_eq!(reply.prompt().keyboard, Keyboard::Remove);
    }
}
