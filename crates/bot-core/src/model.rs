//! Domain records shared across the workspace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat identity on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Dialog state of a qualification session.
///
/// Every state except [`State::Start`] doubles as a funnel milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Fresh session; nothing asked yet.
    #[default]
    Start,
    Intro,
    Purpose,
    Bedrooms,
    Payment,
    /// Offer shown, waiting for a contact channel choice.
    FinalMessage,
    RequestPhone,
    LeadSaved,
}

impl State {
    /// Stable identifier used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Start => "start",
            State::Intro => "intro",
            State::Purpose => "purpose",
            State::Bedrooms => "bedrooms",
            State::Payment => "payment",
            State::FinalMessage => "final_message",
            State::RequestPhone => "request_phone",
            State::LeadSaved => "lead_saved",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown state identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state: {0}")]
pub struct UnknownState(pub String);

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(State::Start),
            "intro" => Ok(State::Intro),
            "purpose" => Ok(State::Purpose),
            "bedrooms" => Ok(State::Bedrooms),
            "payment" => Ok(State::Payment),
            "final_message" => Ok(State::FinalMessage),
            "request_phone" => Ok(State::RequestPhone),
            "lead_saved" => Ok(State::LeadSaved),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// A completed qualification with a captured phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub chat_id: ChatId,
    pub purpose: String,
    pub bedroom_count: String,
    pub payment_method: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one completed broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastStat {
    pub total: u32,
    pub sent: u32,
    pub failed: u32,
    pub created_at: DateTime<Utc>,
}
