//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use dialog::PhoneStepPolicy;
use dispatcher::DispatcherConfig;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token.
    pub bot_token: String,
    /// SQLite path or URL.
    pub database_url: String,
    /// Raw comma-separated operator chat IDs.
    pub admin_chat_ids: String,
    /// Health endpoint bind address.
    pub health_addr: SocketAddr,
    pub dialog_variant: PhoneStepPolicy,
    /// Optional JSON file overriding the dialog copy.
    pub script_path: Option<PathBuf>,
    pub reset_delay: Duration,
    pub idle_timeout: Duration,
    pub max_sessions: usize,
    /// Per-recipient broadcast send timeout. `None` waits indefinitely.
    pub broadcast_send_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TELEGRAM_BOT_TOKEN` | Bot token | (required) |
    /// | `LEADS_SQLITE_DSN` | SQLite path or URL | `leads.db` |
    /// | `ADMIN_CHAT_IDS` | Comma-separated operator chat IDs | (empty) |
    /// | `HEALTH_ADDR` | Health endpoint bind address | `0.0.0.0:8080` |
    /// | `DIALOG_VARIANT` | `channel` or `direct` | `channel` |
    /// | `DIALOG_SCRIPT_PATH` | JSON dialog copy override | (unset) |
    /// | `SESSION_RESET_SECS` | Session reset after a lead | `120` |
    /// | `SESSION_IDLE_SECS` | Idle session expiry | `86400` |
    /// | `MAX_SESSIONS` | Session table capacity | `10000` |
    /// | `BROADCAST_SEND_TIMEOUT_SECS` | Per-recipient timeout, `0` disables | `10` |
    ///
    /// CRM delivery is configured separately through
    /// [`lead_delivery::MacroCrmConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bot_token = var("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::MissingToken)?;

        let database_url = var("LEADS_SQLITE_DSN").unwrap_or_else(|| "leads.db".to_string());

        let admin_chat_ids = var("ADMIN_CHAT_IDS").unwrap_or_default();

        let health_addr = var("HEALTH_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let dialog_variant = match var("DIALOG_VARIANT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVariant(raw.clone()))?,
            None => PhoneStepPolicy::default(),
        };

        let script_path = var("DIALOG_SCRIPT_PATH").map(PathBuf::from);

        let reset_delay = Duration::from_secs(number(&var, "SESSION_RESET_SECS", 120)?);
        let idle_timeout = Duration::from_secs(number(&var, "SESSION_IDLE_SECS", 86_400)?);
        let max_sessions = number(&var, "MAX_SESSIONS", 10_000)?;
        if max_sessions == 0 {
            return Err(ConfigError::InvalidNumber("MAX_SESSIONS"));
        }

        let broadcast_send_timeout = match number(&var, "BROADCAST_SEND_TIMEOUT_SECS", 10)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            bot_token,
            database_url,
            admin_chat_ids,
            health_addr,
            dialog_variant,
            script_path,
            reset_delay,
            idle_timeout,
            max_sessions: max_sessions as usize,
            broadcast_send_timeout,
        })
    }

    /// Dispatcher tuning derived from this configuration.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            reset_delay: self.reset_delay,
            idle_timeout: self.idle_timeout,
            max_sessions: self.max_sessions,
            ..DispatcherConfig::default()
        }
    }
}

fn number<F>(var: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN environment variable is required")]
    MissingToken,

    #[error("Invalid HEALTH_ADDR format")]
    InvalidAddr,

    #[error("Unknown DIALOG_VARIANT: {0}")]
    InvalidVariant(String),

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.database_url, "leads.db");
        assert_eq!(config.health_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.dialog_variant, PhoneStepPolicy::ChannelChoice);
        assert!(config.script_path.is_none());
        assert_eq!(config.reset_delay, Duration::from_secs(120));
        assert_eq!(config.idle_timeout, Duration::from_secs(86_400));
        assert_eq!(config.max_sessions, 10_000);
        assert_eq!(config.broadcast_send_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingToken)));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "  ")]),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("LEADS_SQLITE_DSN", "sqlite:/var/lib/bot/leads.db"),
            ("ADMIN_CHAT_IDS", "1, 2"),
            ("HEALTH_ADDR", "127.0.0.1:9000"),
            ("DIALOG_VARIANT", "direct"),
            ("DIALOG_SCRIPT_PATH", "/etc/bot/script.json"),
            ("SESSION_RESET_SECS", "5"),
            ("MAX_SESSIONS", "50"),
            ("BROADCAST_SEND_TIMEOUT_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "sqlite:/var/lib/bot/leads.db");
        assert_eq!(config.admin_chat_ids, "1, 2");
        assert_eq!(config.health_addr.port(), 9000);
        assert_eq!(config.dialog_variant, PhoneStepPolicy::Direct);
        assert_eq!(
            config.script_path,
            Some(PathBuf::from("/etc/bot/script.json"))
        );
        assert!(config.broadcast_send_timeout.is_none());

        let dispatcher = config.dispatcher_config();
        assert_eq!(dispatcher.reset_delay, Duration::from_secs(5));
        assert_eq!(dispatcher.max_sessions, 50);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("HEALTH_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr)
        ));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("DIALOG_VARIANT", "sideways")]),
            Err(ConfigError::InvalidVariant(_))
        ));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("SESSION_IDLE_SECS", "-1")]),
            Err(ConfigError::InvalidNumber("SESSION_IDLE_SECS"))
        ));
        assert!(matches!(
            load(&[("TELEGRAM_BOT_TOKEN", "t"), ("MAX_SESSIONS", "0")]),
            Err(ConfigError::InvalidNumber("MAX_SESSIONS"))
        ));
    }
}
