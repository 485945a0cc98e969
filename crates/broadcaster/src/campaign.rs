//! The broadcast campaign workflow: compose, confirm, fan out.

use std::sync::Arc;
use std::time::Duration;

use bot_core::{BroadcastStat, BroadcastStatStore, ChatId, MessageSender, UserDirectory};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::session::{BroadcastReply, BroadcastSession, BroadcastState};
use crate::Error;

pub const SEND_OPTION: &str = "Отправить";
pub const CANCEL_OPTION: &str = "Отмена";

const COMPOSE_PROMPT: &str = "Введите текст рассылки сообщением или пришлите фото с подписью.";
const EMPTY_TEXT: &str = "Текст не должен быть пустым. Введите текст рассылки:";
const CONFIRM_TEXT: &str = "Подтвердите отправку рассылки:";
const CONFIRM_PHOTO: &str = "Подтвердите отправку рассылки с фото:";
const EMPTY_PHOTO: &str = "Не удалось получить изображение. Пришлите фото еще раз.";
const CANCELLED: &str = "Рассылка отменена.";
const CHOOSE: &str = "Выберите: Отправить или Отмена";
const NO_STATS: &str = "Статистика недоступна или отсутствует";

/// Text shown to the operator when recipients cannot be listed.
pub const RECIPIENTS_UNAVAILABLE: &str = "Не удалось получить список пользователей";

/// Outcome counts of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    pub total: u32,
    pub sent: u32,
    pub failed: u32,
}

/// Runs the broadcast workflow over borrowed operator sessions.
#[derive(Clone)]
pub struct CampaignManager {
    users: Arc<dyn UserDirectory>,
    sender: Arc<dyn MessageSender>,
    stats: Arc<dyn BroadcastStatStore>,
    send_timeout: Option<Duration>,
}

impl CampaignManager {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        sender: Arc<dyn MessageSender>,
        stats: Arc<dyn BroadcastStatStore>,
    ) -> Self {
        Self {
            users,
            sender,
            stats,
            send_timeout: None,
        }
    }

    /// Count sends slower than `timeout` as failures.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Begin composing a new broadcast, dropping any previous draft.
    pub fn start(&self, session: &mut BroadcastSession) -> BroadcastReply {
        session.clear();
        session.state = BroadcastState::Composing;
        BroadcastReply::text(COMPOSE_PROMPT)
    }

    /// Accept broadcast text. Returns `None` unless the session is composing.
    pub fn receive_text(&self, session: &mut BroadcastSession, text: &str) -> Option<BroadcastReply> {
        if session.state != BroadcastState::Composing {
            return None;
        }
        if text.trim().is_empty() {
            debug!("Empty broadcast text rejected");
            return Some(BroadcastReply::text(EMPTY_TEXT));
        }

        session.text = Some(text.to_string());
        session.photo = None;
        session.caption = None;
        session.state = BroadcastState::Confirming;
        Some(BroadcastReply::with_options(
            CONFIRM_TEXT,
            &[SEND_OPTION, CANCEL_OPTION],
        ))
    }

    /// Accept a broadcast photo. Works from any state.
    pub fn receive_photo(
        &self,
        session: &mut BroadcastSession,
        photo: &str,
        caption: Option<&str>,
    ) -> BroadcastReply {
        if photo.trim().is_empty() {
            debug!("Empty photo reference rejected");
            return BroadcastReply::text(EMPTY_PHOTO);
        }

        session.photo = Some(photo.to_string());
        session.caption = caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        session.text = None;
        session.state = BroadcastState::Confirming;
        BroadcastReply::with_options(CONFIRM_PHOTO, &[SEND_OPTION, CANCEL_OPTION])
    }

    /// Handle the operator's answer to the confirmation prompt.
    ///
    /// Returns `Ok(None)` unless the session is confirming. A failure to list
    /// recipients leaves the session confirming and sends nothing.
    pub async fn confirm(
        &self,
        session: &mut BroadcastSession,
        command: &str,
    ) -> Result<Option<BroadcastReply>, Error> {
        if session.state != BroadcastState::Confirming {
            return Ok(None);
        }

        match command.trim() {
            CANCEL_OPTION => {
                session.clear();
                info!("Broadcast cancelled");
                Ok(Some(BroadcastReply::text(CANCELLED)))
            }
            SEND_OPTION => {
                let recipients = self
                    .users
                    .list_chat_ids()
                    .await
                    .map_err(Error::Recipients)?;

                let draft = std::mem::take(session);
                let delivery = self.fan_out(&draft, &recipients).await;
                self.record(delivery).await;

                Ok(Some(BroadcastReply::text(format!(
                    "Рассылка отправлена: {} успешно, {} с ошибками.",
                    delivery.sent, delivery.failed
                ))))
            }
            _ => Ok(Some(BroadcastReply::with_options(
                CHOOSE,
                &[SEND_OPTION, CANCEL_OPTION],
            ))),
        }
    }

    /// Render the `n` most recent broadcast outcomes.
    pub async fn stats_summary(&self, n: usize) -> String {
        let stats = match self.stats.list_recent(n).await {
            Ok(stats) if !stats.is_empty() => stats,
            Ok(_) => return NO_STATS.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to load broadcast stats");
                return NO_STATS.to_string();
            }
        };

        let mut out = String::from("Последние рассылки:\n");
        for (i, stat) in stats.iter().enumerate() {
            out.push_str(&format!(
                "{}) {} — всего: {}, отправлено: {}, ошибки: {}\n",
                i + 1,
                stat.created_at.format("%Y-%m-%d %H:%M"),
                stat.total,
                stat.sent,
                stat.failed
            ));
        }
        out
    }

    async fn fan_out(&self, draft: &BroadcastSession, recipients: &[ChatId]) -> Delivery {
        let mut delivery = Delivery {
            total: recipients.len() as u32,
            ..Default::default()
        };
        info!(recipients = recipients.len(), "Starting broadcast");

        for &chat_id in recipients {
            match self.send_one(draft, chat_id).await {
                Ok(()) => delivery.sent += 1,
                Err(reason) => {
                    warn!(chat_id = %chat_id, error = %reason, "Broadcast send failed");
                    delivery.failed += 1;
                }
            }
        }

        info!(
            total = delivery.total,
            sent = delivery.sent,
            failed = delivery.failed,
            "Broadcast finished"
        );
        delivery
    }

    async fn send_one(&self, draft: &BroadcastSession, chat_id: ChatId) -> Result<(), String> {
        let send = async {
            match &draft.photo {
                Some(photo) => {
                    let caption = draft.caption.as_deref().unwrap_or_default();
                    self.sender.send_photo(chat_id, photo, caption).await
                }
                None => {
                    let text = draft.text.as_deref().unwrap_or_default();
                    self.sender.send_text(chat_id, text).await
                }
            }
        };

        match self.send_timeout {
            Some(limit) => match tokio::time::timeout(limit, send).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {:?}", limit)),
            },
            None => send.await.map_err(|e| e.to_string()),
        }
    }

    async fn record(&self, delivery: Delivery) {
        let stat = BroadcastStat {
            total: delivery.total,
            sent: delivery.sent,
            failed: delivery.failed,
            created_at: Utc::now(),
        };
        if let Err(e) = self.stats.save(&stat).await {
            warn!(error = %e, "Failed to save broadcast stat");
        }
    }
}
