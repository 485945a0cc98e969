//! Lead forwarding for the lead funnel bot.
//!
//! - [`LeadGateway`] forwards captured leads in the background with a timeout
//! - [`MacroCrmClient`] is a [`LeadDelivery`](bot_core::LeadDelivery) that
//!   posts leads to the MacroCRM estate request API
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lead_delivery::{LeadGateway, MacroCrmClient, MacroCrmConfig};
//!
//! # fn example() -> Result<(), bot_core::DeliveryError> {
//! if let Some(config) = MacroCrmConfig::from_env() {
//!     let gateway = LeadGateway::new(Arc::new(MacroCrmClient::new(config)?));
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod gateway;
mod macrocrm;

pub use config::{MacroCrmConfig, DEFAULT_BASE_URL};
pub use gateway::{LeadGateway, DEFAULT_FORWARD_TIMEOUT};
pub use macrocrm::{sign, MacroCrmClient};
