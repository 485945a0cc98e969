//! Dispatch loop for the lead funnel bot.
//!
//! The [`Dispatcher`] receives inbound chat events one at a time. Operators
//! (per [`AdminPolicy`]) are routed to the broadcast workflow; everyone else
//! goes through the qualification dialog. The dispatcher owns the session
//! tables, expires idle sessions, and resets a session a while after its
//! lead was captured.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bot_core::InboundEvent;
//! use dialog::Dialog;
//! use dispatcher::{AdminPolicy, Dispatcher, DispatcherConfig};
//! use memory_store::{MemoryStore, RecordingSender};
//!
//! # async fn example() -> Result<(), dispatcher::DispatchError> {
//! let dispatcher = Dispatcher::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(RecordingSender::new()),
//!     Dialog::default(),
//!     AdminPolicy::from_list("123456"),
//!     DispatcherConfig::default(),
//! );
//!
//! let events = futures::stream::iter(vec![InboundEvent::text(42, "/start")]);
//! dispatcher.run(events).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod policy;
mod reset;
mod session_table;

pub use config::{DispatcherConfig, DEFAULT_IDLE_TIMEOUT, DEFAULT_RESET_DELAY};
pub use dispatcher::{
    BotStore, DispatchError, Dispatcher, ProcessResult, ACCESS_DENIED, ADMIN_COMMAND, ADMIN_MENU,
    CREATE_BROADCAST, SHOW_FUNNEL, SHOW_STATS,
};
pub use policy::AdminPolicy;
pub use reset::ResetScheduler;
pub use session_table::SessionTable;
