//! Operator authorisation.

use std::collections::HashSet;

use bot_core::ChatId;
use tracing::warn;

/// The fixed set of chats allowed to run admin commands.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    admins: HashSet<ChatId>,
}

impl AdminPolicy {
    pub fn new(admins: impl IntoIterator<Item = ChatId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list of chat IDs, skipping invalid entries.
    pub fn from_list(list: &str) -> Self {
        let admins = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match s.parse::<i64>() {
                Ok(id) => Some(ChatId(id)),
                Err(_) => {
                    warn!(entry = %s, "Skipping invalid admin chat id");
                    None
                }
            });
        Self::new(admins)
    }

    pub fn is_admin(&self, chat_id: ChatId) -> bool {
        self.admins.contains(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}
