//! Broadcast campaigns for the lead funnel bot.
//!
//! An operator composes a text or photo message, confirms it, and the
//! [`CampaignManager`] sends it to every known chat, counting successes and
//! failures per recipient and recording a `BroadcastStat`.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = CampaignManager::new(users, sender, stats);
//! let mut session = BroadcastSession::default();
//!
//! manager.start(&mut session);
//! manager.receive_text(&mut session, "Новые предложения недели");
//! let reply = manager.confirm(&mut session, "Отправить").await?;
//! ```

mod campaign;
mod session;

use bot_core::StoreError;
use thiserror::Error;

pub use campaign::{CampaignManager, Delivery, CANCEL_OPTION, RECIPIENTS_UNAVAILABLE, SEND_OPTION};
pub use session::{BroadcastReply, BroadcastSession, BroadcastState};

/// Errors that abort a broadcast.
#[derive(Debug, Error)]
pub enum Error {
    /// The recipient list could not be loaded; nothing was sent.
    #[error("failed to list recipients: {0}")]
    Recipients(#[source] StoreError),
}

/// Alias used by callers that import several crates' errors.
pub type BroadcastError = Error;
