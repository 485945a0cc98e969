//! Routes inbound events to the dialog or the broadcast workflow.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bot_core::{
    BroadcastStatStore, ChatId, FunnelStore, InboundEvent, LeadStore, MessageSender, Payload,
    Prompt, State, UserDirectory,
};
use broadcaster::{BroadcastSession, CampaignManager, RECIPIENTS_UNAVAILABLE};
use chrono::Utc;
use dialog::{Dialog, Session};
use funnel::{FunnelAnalytics, NO_FUNNEL_DATA};
use futures::{Stream, StreamExt};
use lead_delivery::LeadGateway;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::DispatcherConfig;
use crate::policy::AdminPolicy;
use crate::reset::ResetScheduler;
use crate::session_table::SessionTable;

pub const ADMIN_COMMAND: &str = "/admin";
pub const ADMIN_MENU: &str = "Админ-меню";
pub const CREATE_BROADCAST: &str = "Создать рассылку";
pub const SHOW_STATS: &str = "Статистика";
pub const SHOW_FUNNEL: &str = "Воронка";
pub const ACCESS_DENIED: &str = "Доступ запрещен";

/// Every store the dispatcher needs, implemented by one backend.
pub trait BotStore: UserDirectory + LeadStore + FunnelStore + BroadcastStatStore {}

impl<T> BotStore for T where T: UserDirectory + LeadStore + FunnelStore + BroadcastStatStore {}

/// Errors that stop the dispatch loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The inbound event stream ended.
    #[error("inbound event stream ended")]
    StreamEnded,
}

/// Result of handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// A visitor event went through the dialog.
    Dialog {
        chat_id: ChatId,
        state: State,
        lead_captured: bool,
    },
    /// An operator event went through the admin workflow.
    Admin { chat_id: ChatId },
    /// A non-operator tried an admin command.
    Denied { chat_id: ChatId },
}

/// The serial dispatch loop and the session tables it owns.
pub struct Dispatcher {
    dialog: Dialog,
    campaigns: CampaignManager,
    funnel: FunnelAnalytics,
    users: Arc<dyn UserDirectory>,
    leads: Arc<dyn LeadStore>,
    sender: Arc<dyn MessageSender>,
    gateway: Option<LeadGateway>,
    admins: AdminPolicy,
    config: DispatcherConfig,
    sessions: Arc<Mutex<SessionTable<Session>>>,
    drafts: Mutex<HashMap<ChatId, BroadcastSession>>,
    resets: ResetScheduler,
}

impl Dispatcher {
    /// Create a dispatcher over one store backend.
    ///
    /// Spawns the reset scheduler, so this must run inside a tokio runtime.
    pub fn new<S>(
        store: Arc<S>,
        sender: Arc<dyn MessageSender>,
        dialog: Dialog,
        admins: AdminPolicy,
        config: DispatcherConfig,
    ) -> Self
    where
        S: BotStore + 'static,
    {
        let campaigns = CampaignManager::new(store.clone(), sender.clone(), store.clone());
        let sessions = Arc::new(Mutex::new(SessionTable::new(config.max_sessions)));
        let (resets, _task) = ResetScheduler::spawn(sessions.clone());

        Self {
            dialog,
            campaigns,
            funnel: FunnelAnalytics::new(store.clone()),
            users: store.clone(),
            leads: store,
            sender,
            gateway: None,
            admins,
            config,
            sessions,
            drafts: Mutex::new(HashMap::new()),
            resets,
        }
    }

    /// Forward captured leads through `gateway`.
    pub fn with_gateway(mut self, gateway: LeadGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Replace the campaign manager, e.g. to set a send timeout.
    pub fn with_campaigns(mut self, campaigns: CampaignManager) -> Self {
        self.campaigns = campaigns;
        self
    }

    pub fn funnel(&self) -> &FunnelAnalytics {
        &self.funnel
    }

    pub fn campaigns(&self) -> &CampaignManager {
        &self.campaigns
    }

    /// Current dialog state of a chat, if it has a session.
    pub async fn session_state(&self, chat_id: ChatId) -> Option<State> {
        self.sessions.lock().await.get(chat_id).map(|s| s.state)
    }

    /// Handle one inbound event. Never fails; problems are logged.
    pub async fn handle(&self, event: InboundEvent) -> ProcessResult {
        let chat_id = event.chat_id;

        if self.admins.is_admin(chat_id) {
            self.handle_admin(chat_id, &event.payload).await;
            return ProcessResult::Admin { chat_id };
        }

        if event.text_or_empty().trim() == ADMIN_COMMAND {
            warn!(chat_id = %chat_id, "Admin command from non-admin");
            self.send(chat_id, &Prompt::text(ACCESS_DENIED)).await;
            return ProcessResult::Denied { chat_id };
        }

        self.handle_visitor(chat_id, &event.payload).await
    }

    async fn handle_visitor(&self, chat_id: ChatId, payload: &Payload) -> ProcessResult {
        if let Err(e) = self.users.save_user(chat_id).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to save user");
        }

        let (reply, state, lead) = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.touch(chat_id);
            let reply = self.dialog.handle(session, payload);
            let lead = if reply.lead_captured {
                session.to_lead(chat_id, Utc::now())
            } else {
                None
            };
            (reply, session.state, lead)
        };

        if reply.advance_to == Some(State::Intro) {
            self.resets.cancel(chat_id);
        }

        if let Some(lead) = &lead {
            info!(chat_id = %chat_id, "Lead captured");
            if let Err(e) = self.leads.save_lead(lead).await {
                error!(chat_id = %chat_id, error = %e, "Failed to save lead");
            }
            match &self.gateway {
                Some(gateway) => {
                    gateway.forward(lead.clone());
                }
                None => debug!(chat_id = %chat_id, "No lead delivery configured"),
            }
        }

        if let Err(e) = self.funnel.reach(chat_id, state).await {
            warn!(chat_id = %chat_id, state = %state, error = %e, "Failed to record funnel hit");
        }

        if let Some(preface) = &reply.preface {
            self.send(chat_id, &Prompt::text(preface.clone())).await;
        }
        self.send(chat_id, &reply.prompt()).await;

        if lead.is_some() {
            self.resets.schedule(chat_id, self.config.reset_delay);
        }

        ProcessResult::Dialog {
            chat_id,
            state,
            lead_captured: lead.is_some(),
        }
    }

    async fn handle_admin(&self, chat_id: ChatId, payload: &Payload) {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts.entry(chat_id).or_default();

        let reply = match payload {
            Payload::Photo { file_id, caption } => Some(
                self.campaigns
                    .receive_photo(draft, file_id, Some(caption.as_str()))
                    .prompt(),
            ),
            Payload::Contact { .. } => Some(admin_menu()),
            Payload::Text(raw) => {
                let text = raw.trim();
                match text {
                    ADMIN_COMMAND => {
                        *draft = BroadcastSession::default();
                        Some(admin_menu())
                    }
                    // Menu commands win over a draft in progress.
                    CREATE_BROADCAST | SHOW_STATS | SHOW_FUNNEL => {
                        self.admin_command(chat_id, draft, text).await
                    }
                    _ => match self.campaigns.receive_text(draft, raw) {
                        Some(reply) => Some(reply.prompt()),
                        None => match self.campaigns.confirm(draft, text).await {
                            Ok(Some(reply)) => Some(reply.prompt()),
                            Ok(None) => Some(admin_menu()),
                            Err(e) => {
                                error!(chat_id = %chat_id, error = %e, "Broadcast aborted");
                                Some(Prompt::text(RECIPIENTS_UNAVAILABLE))
                            }
                        },
                    },
                }
            }
        };

        if let Some(reply) = reply {
            self.send(chat_id, &reply).await;
        }
    }

    /// Operator menu commands. A draft in progress is kept unless a new
    /// broadcast is started.
    async fn admin_command(
        &self,
        chat_id: ChatId,
        draft: &mut BroadcastSession,
        command: &str,
    ) -> Option<Prompt> {
        match command {
            CREATE_BROADCAST => Some(self.campaigns.start(draft).prompt()),
            SHOW_STATS => {
                let summary = self.campaigns.stats_summary(self.config.stats_rows).await;
                Some(Prompt::with_options(summary, menu_options()))
            }
            SHOW_FUNNEL => {
                let series = self.funnel.chart_series().await;
                if series.values.iter().any(|&v| v > 0) {
                    match self
                        .sender
                        .send_chart(chat_id, &series.labels, &series.values)
                        .await
                    {
                        Ok(()) => return None,
                        Err(e) => debug!(error = %e, "Chart unavailable, sending text report"),
                    }
                }
                let text = match self.funnel.report().await {
                    Some(report) => report.to_string(),
                    None => NO_FUNNEL_DATA.to_string(),
                };
                Some(Prompt::with_options(text, menu_options()))
            }
            _ => Some(admin_menu()),
        }
    }

    async fn send(&self, chat_id: ChatId, prompt: &Prompt) {
        if let Err(e) = self.sender.send_prompt(chat_id, prompt).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to send message");
        }
    }

    /// Drop sessions idle for longer than the configured timeout.
    pub async fn sweep_idle(&self) -> usize {
        let removed = self
            .sessions
            .lock()
            .await
            .sweep_idle(self.config.idle_timeout);
        if removed > 0 {
            info!(removed, "Dropped idle sessions");
        }
        removed
    }

    /// Process events until the stream ends.
    pub async fn run<St>(&self, events: St) -> Result<(), DispatchError>
    where
        St: Stream<Item = InboundEvent>,
    {
        self.run_with_shutdown(events, std::future::pending()).await
    }

    /// Process events until the shutdown signal completes or the stream ends.
    ///
    /// Events are handled one at a time. The idle sweep runs between events.
    pub async fn run_with_shutdown<St, F>(&self, events: St, shutdown: F) -> Result<(), DispatchError>
    where
        St: Stream<Item = InboundEvent>,
        F: Future<Output = ()>,
    {
        info!(admins = self.admins.len(), "Starting dispatcher");

        tokio::pin!(events);
        tokio::pin!(shutdown);

        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    info!("Shutdown signal received, stopping dispatcher");
                    return Ok(());
                }

                event = events.next() => match event {
                    Some(event) => {
                        let result = self.handle(event).await;
                        debug!(?result, "Event handled");
                    }
                    None => {
                        warn!("Inbound event stream ended");
                        return Err(DispatchError::StreamEnded);
                    }
                },

                _ = sweep.tick() => {
                    self.sweep_idle().await;
                }
            }
        }
    }

    /// Run until Ctrl+C is pressed.
    #[cfg(feature = "signal")]
    pub async fn run_until_stopped<St>(&self, events: St) -> Result<(), DispatchError>
    where
        St: Stream<Item = InboundEvent>,
    {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };
        self.run_with_shutdown(events, shutdown).await
    }
}

fn menu_options() -> Vec<String> {
    [CREATE_BROADCAST, SHOW_STATS, SHOW_FUNNEL]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn admin_menu() -> Prompt {
    Prompt::with_options(ADMIN_MENU, menu_options())
}
