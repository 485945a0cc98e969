//! Fire-and-forget lead forwarding.

use std::sync::Arc;
use std::time::Duration;

use bot_core::{Lead, LeadDelivery};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Default upper bound on one forwarding attempt.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(15);

/// Forwards leads to a [`LeadDelivery`] in the background.
///
/// Failures and timeouts are logged and never retried.
#[derive(Clone)]
pub struct LeadGateway {
    delivery: Arc<dyn LeadDelivery>,
    timeout: Duration,
}

impl LeadGateway {
    pub fn new(delivery: Arc<dyn LeadDelivery>) -> Self {
        Self {
            delivery,
            timeout: DEFAULT_FORWARD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start forwarding a lead without waiting for the outcome.
    ///
    /// The returned handle is only useful to tests; dropping it detaches
    /// the task.
    pub fn forward(&self, lead: Lead) -> JoinHandle<()> {
        let delivery = self.delivery.clone();
        let limit = self.timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(limit, delivery.send_lead(&lead)).await {
                Ok(Ok(())) => info!(chat_id = %lead.chat_id, "Lead forwarded"),
                Ok(Err(e)) => warn!(chat_id = %lead.chat_id, error = %e, "Lead forwarding failed"),
                Err(_) => warn!(
                    chat_id = %lead.chat_id,
                    timeout_secs = limit.as_secs(),
                    "Lead forwarding timed out"
                ),
            }
        })
    }
}
