//! Long polling and conversion of Telegram messages into inbound events.

use bot_core::{InboundEvent, Payload};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Start long polling and forward supported private messages to `tx`.
///
/// Non-message updates and group chats are ignored. The task ends when
/// polling stops.
pub fn spawn(bot: Bot, tx: mpsc::Sender<InboundEvent>) -> JoinHandle<()> {
    info!("Starting Telegram long polling");

    tokio::spawn(async move {
        let handler = Update::filter_message().endpoint(move |msg: Message| {
            let tx = tx.clone();
            async move {
                if !is_private(&msg) {
                    debug!(chat_id = msg.chat.id.0, "Ignoring non-private message");
                    return respond(());
                }

                match to_event(&msg) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            warn!("Inbound channel closed, dropping message");
                        }
                    }
                    None => debug!(msg_id = msg.id.0, "Ignoring unsupported message type"),
                }

                respond(())
            }
        });

        Dispatcher::builder(bot, handler)
            .default_handler(|_| async {})
            .build()
            .dispatch()
            .await;

        info!("Telegram long polling stopped");
    })
}

fn is_private(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Convert a message into an inbound event.
///
/// A shared contact wins over text. Photos use the largest size and an
/// empty caption when none was given. Anything else yields `None`.
fn to_event(msg: &Message) -> Option<InboundEvent> {
    let payload = if let Some(contact) = msg.contact() {
        Payload::Contact {
            phone: contact.phone_number.clone(),
        }
    } else if let Some(photos) = msg.photo() {
        let largest = photos.last()?;
        Payload::Photo {
            file_id: largest.file.id.to_string(),
            caption: msg.caption().unwrap_or_default().to_string(),
        }
    } else {
        Payload::Text(msg.text()?.to_string())
    };

    Some(InboundEvent {
        chat_id: msg.chat.id.0.into(),
        payload,
    })
}
