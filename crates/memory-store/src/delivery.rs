//! A lead delivery that records forwarded leads.

use async_trait::async_trait;
use bot_core::{DeliveryError, Lead, LeadDelivery};
use tokio::sync::Mutex;

/// Records every forwarded lead; optionally fails each delivery.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<Lead>>,
    fail: bool,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delivery that records the attempt but reports a remote failure.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Leads passed to `send_lead`, including failed attempts.
    pub async fn delivered(&self) -> Vec<Lead> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl LeadDelivery for RecordingDelivery {
    async fn send_lead(&self, lead: &Lead) -> Result<(), DeliveryError> {
        self.delivered.lock().await.push(lead.clone());
        if self.fail {
            return Err(DeliveryError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}
