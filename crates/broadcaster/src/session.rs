//! Per-operator compose state.

use bot_core::Prompt;

/// Where an operator is in the broadcast workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastState {
    #[default]
    Idle,
    Composing,
    Confirming,
}

/// Payload being composed by one operator.
///
/// In `Confirming` exactly one of `text` and `photo` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastSession {
    pub state: BroadcastState,
    pub text: Option<String>,
    pub photo: Option<String>,
    pub caption: Option<String>,
}

impl BroadcastSession {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.state != BroadcastState::Idle
    }
}

/// Text and options to show the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReply {
    pub text: String,
    pub options: Vec<String>,
}

impl BroadcastReply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub(crate) fn with_options(text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn prompt(&self) -> Prompt {
        if self.options.is_empty() {
            Prompt::removing_keyboard(self.text.clone())
        } else {
            Prompt::with_options(self.text.clone(), self.options.clone())
        }
    }
}
