//! Configuration for the MacroCRM client.

use std::env;
use std::time::Duration;

/// Default MacroCRM API host.
pub const DEFAULT_BASE_URL: &str = "https://api.macro.sbercrm.com";

/// Configuration for [`MacroCrmClient`](crate::MacroCrmClient).
#[derive(Debug, Clone)]
pub struct MacroCrmConfig {
    /// API host, without the request path.
    pub base_url: String,

    /// Site domain registered in the CRM.
    pub domain: String,

    /// Application secret used to sign requests.
    pub app_secret: String,

    /// CRM action for new requests.
    pub action: String,

    /// Contact name sent with each lead.
    pub contact_name: String,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for MacroCrmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            domain: String::new(),
            app_secret: String::new(),
            action: "question".to_string(),
            contact_name: "Telegram".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl MacroCrmConfig {
    /// Create configuration from environment variables.
    ///
    /// Returns `None` unless both `MACROCRM_DOMAIN` and `MACROCRM_APP_SECRET`
    /// are set and non-empty.
    ///
    /// Optional environment variables:
    /// - `MACROCRM_BASE_URL` - API host (default: https://api.macro.sbercrm.com)
    /// - `MACROCRM_ACTION` - CRM action (default: question)
    /// - `MACROCRM_CONTACT_NAME` - contact name (default: Telegram)
    /// - `MACROCRM_TIMEOUT_SECS` - HTTP timeout (default: 10)
    pub fn from_env() -> Option<Self> {
        let domain = non_empty_var("MACROCRM_DOMAIN")?;
        let app_secret = non_empty_var("MACROCRM_APP_SECRET")?;
        let defaults = Self::default();

        Some(Self {
            base_url: non_empty_var("MACROCRM_BASE_URL").unwrap_or(defaults.base_url),
            domain,
            app_secret,
            action: non_empty_var("MACROCRM_ACTION").unwrap_or(defaults.action),
            contact_name: non_empty_var("MACROCRM_CONTACT_NAME").unwrap_or(defaults.contact_name),
            timeout: env::var("MACROCRM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        })
    }

    /// Full URL of the request endpoint.
    pub fn request_url(&self) -> String {
        format!("{}/estate/request/", self.base_url.trim_end_matches('/'))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
