//! Telegram lead funnel bot.
//!
//! Qualifies visitors through a short dialog, stores leads in SQLite,
//! forwards them to MacroCRM when configured, and lets operators send
//! broadcasts. A small HTTP server exposes health and funnel data.

mod config;
mod error;
mod routes;
mod state;
mod telegram;

use std::sync::Arc;

use bot_core::MessageSender;
use broadcaster::CampaignManager;
use database::Database;
use dialog::{Dialog, DialogScript};
use dispatcher::{AdminPolicy, DispatchError, Dispatcher};
use funnel::FunnelAnalytics;
use lead_delivery::{LeadGateway, MacroCrmClient, MacroCrmConfig};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::telegram::TelegramTransport;

/// Inbound events buffered between the poller and the dispatcher.
const EVENT_BUFFER: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        variant = ?config.dialog_variant,
        health_addr = %config.health_addr,
        "Starting lead bot"
    );

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;
    let store = Arc::new(db.clone());

    let script = match &config.script_path {
        Some(path) => {
            info!(path = %path.display(), "Loading dialog script");
            DialogScript::from_json_file(path)?
        }
        None => DialogScript::default(),
    };
    let dialog = Dialog::new(script, config.dialog_variant);

    let transport = TelegramTransport::connect(&config.bot_token).await?;
    let sender: Arc<dyn MessageSender> = Arc::new(transport.sender());

    let mut campaigns = CampaignManager::new(store.clone(), sender.clone(), store.clone());
    if let Some(timeout) = config.broadcast_send_timeout {
        campaigns = campaigns.with_send_timeout(timeout);
    }

    let admins = AdminPolicy::from_list(&config.admin_chat_ids);
    if admins.is_empty() {
        warn!("No operators configured, admin commands are disabled");
    }

    let mut dispatcher = Dispatcher::new(
        store.clone(),
        sender,
        dialog,
        admins,
        config.dispatcher_config(),
    )
    .with_campaigns(campaigns);

    match MacroCrmConfig::from_env() {
        Some(crm) => {
            let client = MacroCrmClient::new(crm)?;
            info!(url = %client.config().request_url(), "MacroCRM delivery enabled");
            dispatcher = dispatcher.with_gateway(LeadGateway::new(Arc::new(client)));
        }
        None => info!("MacroCRM delivery disabled"),
    }

    // Start HTTP server
    let app = routes::router().with_state(AppState::new(
        db.clone(),
        FunnelAnalytics::new(store.clone()),
    ));
    let listener = tokio::net::TcpListener::bind(config.health_addr).await?;
    info!(addr = %config.health_addr, "HTTP server listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    let (events, _polling) = transport.listen(EVENT_BUFFER);
    let result = dispatcher
        .run_until_stopped(ReceiverStream::new(events))
        .await;

    db.close().await;

    match result {
        Ok(()) => info!("Lead bot stopped"),
        Err(DispatchError::StreamEnded) => warn!("Telegram polling ended, lead bot stopped"),
    }

    Ok(())
}
