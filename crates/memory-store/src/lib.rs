//! In-memory collaborators for the lead funnel bot.
//!
//! This crate provides implementations of the `bot-core` traits that keep
//! everything in memory:
//! - `MemoryStore` - users, leads, funnel hits and broadcast stats
//! - `FailingStore` - every operation fails, for error-path tests
//! - `RecordingSender` - records outbound messages, can fail per recipient
//! - `DelayedSender` - wraps another sender with artificial delay
//! - `RecordingDelivery` - records forwarded leads
//!
//! For persistent storage, use the `database` crate instead.
//!
//! # Example
//!
//! ```rust
//! use bot_core::{ChatId, MessageSender, UserDirectory};
//! use memory_store::{MemoryStore, RecordingSender};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     store.save_user(ChatId(1)).await.unwrap();
//!
//!     let sender = RecordingSender::new();
//!     sender.send_text(ChatId(1), "Hello!").await.unwrap();
//!     assert_eq!(sender.texts_to(ChatId(1)).await, vec!["Hello!"]);
//! }
//! ```

mod delayed;
mod delivery;
mod sender;
mod store;

pub use delayed::DelayedSender;
pub use delivery::RecordingDelivery;
pub use sender::{RecordingSender, Sent};
pub use store::{FailingStore, MemoryStore};
