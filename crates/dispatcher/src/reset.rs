//! Delayed session resets after lead capture.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bot_core::{ChatId, State};
use dialog::Session;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::time::{delay_queue, DelayQueue};
use tracing::{debug, info};

use crate::session_table::SessionTable;

#[derive(Debug)]
enum Command {
    Schedule { chat_id: ChatId, delay: Duration },
    Cancel(ChatId),
}

/// Handle to the reset actor. Dropping every handle stops the actor.
#[derive(Debug, Clone)]
pub struct ResetScheduler {
    tx: mpsc::UnboundedSender<Command>,
}

impl ResetScheduler {
    /// Spawn the actor over a shared session table.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(sessions: Arc<Mutex<SessionTable<Session>>>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, sessions));
        (Self { tx }, task)
    }

    /// Reset a chat's session after `delay`, replacing any pending reset.
    pub fn schedule(&self, chat_id: ChatId, delay: Duration) {
        if self.tx.send(Command::Schedule { chat_id, delay }).is_err() {
            debug!(chat_id = %chat_id, "Reset scheduler stopped; reset dropped");
        }
    }

    /// Drop a pending reset, if any.
    pub fn cancel(&self, chat_id: ChatId) {
        if self.tx.send(Command::Cancel(chat_id)).is_err() {
            debug!(chat_id = %chat_id, "Reset scheduler stopped; cancel dropped");
        }
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<Command>, sessions: Arc<Mutex<SessionTable<Session>>>) {
    let mut queue: DelayQueue<ChatId> = DelayQueue::new();
    let mut keys: HashMap<ChatId, delay_queue::Key> = HashMap::new();

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule { chat_id, delay }) => {
                    if let Some(key) = keys.remove(&chat_id) {
                        queue.remove(&key);
                    }
                    keys.insert(chat_id, queue.insert(chat_id, delay));
                    debug!(chat_id = %chat_id, delay_secs = delay.as_secs(), "Reset scheduled");
                }
                Some(Command::Cancel(chat_id)) => {
                    if let Some(key) = keys.remove(&chat_id) {
                        queue.remove(&key);
                        debug!(chat_id = %chat_id, "Reset cancelled");
                    }
                }
                None => break,
            },
            Some(expired) = queue.next(), if !queue.is_empty() => {
                let chat_id = expired.into_inner();
                keys.remove(&chat_id);

                let mut table = sessions.lock().await;
                // A conversation restarted since capture is left alone.
                if let Some(session) = table.get_mut(chat_id) {
                    if session.state == State::LeadSaved {
                        *session = Session::default();
                        info!(chat_id = %chat_id, "Session reset after lead");
                    }
                }
            }
        }
    }

    debug!("Reset scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_with(chat_id: ChatId, state: State) -> Arc<Mutex<SessionTable<Session>>> {
        let table = Arc::new(Mutex::new(SessionTable::<Session>::new(8)));
        table.lock().await.touch(chat_id).state = state;
        table
    }

    async fn state_of(table: &Mutex<SessionTable<Session>>, chat_id: ChatId) -> State {
        table.lock().await.get(chat_id).map(|s| s.state).unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_fires_after_delay() {
        let table = table_with(ChatId(1), State::LeadSaved).await;
        let (scheduler, _task) = ResetScheduler::spawn(table.clone());

        scheduler.schedule(ChatId(1), Duration::from_secs(120));
        tokio::time::sleep(Duration::from_secs(119)).await;
        assert_eq!(state_of(&table, ChatId(1)).await, State::LeadSaved);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(state_of(&table, ChatId(1)).await, State::Start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_reset() {
        let table = table_with(ChatId(1), State::LeadSaved).await;
        let (scheduler, _task) = ResetScheduler::spawn(table.clone());

        scheduler.schedule(ChatId(1), Duration::from_secs(10));
        scheduler.cancel(ChatId(1));
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(state_of(&table, ChatId(1)).await, State::LeadSaved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarted_session_untouched() {
        let table = table_with(ChatId(1), State::LeadSaved).await;
        let (scheduler, _task) = ResetScheduler::spawn(table.clone());

        scheduler.schedule(ChatId(1), Duration::from_secs(10));
        table.lock().await.touch(ChatId(1)).state = State::Purpose;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(state_of(&table, ChatId(1)).await, State::Purpose);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_actor() {
        let table = Arc::new(Mutex::new(SessionTable::<Session>::new(8)));
        let (scheduler, task) = ResetScheduler::spawn(table);
        drop(scheduler);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_after_actor_stopped_are_dropped() {
        let table = table_with(ChatId(1), State::LeadSaved).await;
        let (scheduler, task) = ResetScheduler::spawn(table.clone());
        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        scheduler.schedule(ChatId(1), Duration::from_secs(1));
        scheduler.cancel(ChatId(1));
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(state_of(&table, ChatId(1)).await, State::LeadSaved);
    }
}
