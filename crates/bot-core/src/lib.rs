//! Core types and collaborator traits for the lead funnel bot.
//!
//! This crate provides the shared vocabulary for every other crate in the
//! workspace. It defines:
//!
//! - [`ChatId`] and [`State`] - chat identity and the dialog state/milestone enum
//! - [`Lead`] / [`BroadcastStat`] - immutable records produced by the core
//! - [`InboundEvent`] / [`Prompt`] - transport-neutral input and output
//! - [`UserDirectory`], [`LeadStore`], [`FunnelStore`], [`BroadcastStatStore`],
//!   [`LeadDelivery`] and [`MessageSender`] - the collaborator seams
//!
//! # Example
//!
//! ```rust
//! use bot_core::{async_trait, ChatId, MessageSender, SendError};
//!
//! struct PrintSender;
//!
//! #[async_trait]
//! impl MessageSender for PrintSender {
//!     async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
//!         println!("{chat_id}: {text}");
//!         Ok(())
//!     }
//!
//!     async fn send_photo(
//!         &self,
//!         chat_id: ChatId,
//!         photo: &str,
//!         caption: &str,
//!     ) -> Result<(), SendError> {
//!         println!("{chat_id}: [photo {photo}] {caption}");
//!         Ok(())
//!     }
//! }
//! ```

mod error;
mod message;
mod model;
mod trait_def;

pub use error::{DeliveryError, SendError, StoreError};
pub use message::{InboundEvent, Keyboard, Payload, Prompt};
pub use model::{BroadcastStat, ChatId, Lead, State, UnknownState};
pub use trait_def::{
    BroadcastStatStore, FunnelStore, LeadDelivery, LeadStore, MessageSender, UserDirectory,
    DEFAULT_RECENT_STATS,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
