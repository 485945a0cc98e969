//! End-to-end flows through the dispatcher with in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use bot_core::{ChatId, FunnelStore, InboundEvent, Keyboard, State, UserDirectory};
use broadcaster::CampaignManager;
use dialog::{Dialog, DialogScript, PhoneStepPolicy};
use dispatcher::{
    AdminPolicy, DispatchError, Dispatcher, DispatcherConfig, ProcessResult, ACCESS_DENIED,
    ADMIN_MENU, CREATE_BROADCAST, SHOW_FUNNEL, SHOW_STATS,
};
use lead_delivery::LeadGateway;
use memory_store::{FailingStore, MemoryStore, RecordingDelivery, RecordingSender, Sent};

const ADMIN: ChatId = ChatId(1000);
const VISITOR: ChatId = ChatId(7);

struct Harness {
    store: Arc<MemoryStore>,
    sender: Arc<RecordingSender>,
    delivery: Arc<RecordingDelivery>,
    dispatcher: Dispatcher,
}

fn harness(policy: PhoneStepPolicy, sender: RecordingSender) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let sender = Arc::new(sender);
    let delivery = Arc::new(RecordingDelivery::new());
    let dispatcher = Dispatcher::new(
        store.clone(),
        sender.clone(),
        Dialog::new(DialogScript::default(), policy),
        AdminPolicy::new([ADMIN]),
        DispatcherConfig::default(),
    )
    .with_gateway(LeadGateway::new(delivery.clone()));

    Harness {
        store,
        sender,
        delivery,
        dispatcher,
    }
}

async fn say(h: &Harness, chat_id: ChatId, text: &str) -> ProcessResult {
    h.dispatcher.handle(InboundEvent::text(chat_id, text)).await
}

async fn qualify(h: &Harness, chat_id: ChatId) {
    for text in ["/start", "Хочу", "Для инвестиций", "3 и более спален", "Ипотека"] {
        say(h, chat_id, text).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_direct_flow_captures_lead_and_resets() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    qualify(&h, VISITOR).await;
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::RequestPhone));

    let result = say(&h, VISITOR, "8 (999) 123-45-67").await;
    assert_eq!(
        result,
        ProcessResult::Dialog {
            chat_id: VISITOR,
            state: State::LeadSaved,
            lead_captured: true,
        }
    );

    let leads = h.store.leads().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].purpose, "Для инвестиций");
    assert_eq!(leads[0].bedroom_count, "3 и более спален");
    assert_eq!(leads[0].payment_method, "Ипотека");
    assert_eq!(leads[0].phone, "8 (999) 123-45-67");

    match h.sender.last_to(VISITOR).await {
        Some(Sent::Prompt { prompt, .. }) => {
            assert_eq!(prompt.text, DialogScript::default().lead_ack);
            assert_eq!(prompt.keyboard, Keyboard::Remove);
        }
        other => panic!("expected ack prompt, got {:?}", other),
    }

    // Let the detached delivery task run.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.delivery.delivered().await.len(), 1);

    tokio::time::sleep(Duration::from_secs(119)).await;
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::LeadSaved));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::Start));
}

#[tokio::test]
async fn test_channel_flow_needs_expert_choice() {
    let h = harness(PhoneStepPolicy::ChannelChoice, RecordingSender::new());
    qualify(&h, VISITOR).await;
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::FinalMessage));

    say(&h, VISITOR, "В Telegram").await;
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::FinalMessage));

    say(&h, VISITOR, "Связаться с экспертом").await;
    match h.sender.last_to(VISITOR).await {
        Some(Sent::Prompt { prompt, .. }) => {
            assert_eq!(
                prompt.keyboard,
                Keyboard::RequestContact("Отправить номер".to_string())
            );
        }
        other => panic!("expected phone request, got {:?}", other),
    }

    let result = h
        .dispatcher
        .handle(InboundEvent::contact(VISITOR, "+79991234567"))
        .await;
    assert!(matches!(result, ProcessResult::Dialog { lead_captured: true, .. }));
    assert_eq!(h.store.leads().await.len(), 1);
}

#[tokio::test]
async fn test_rejected_phone_does_not_advance() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    qualify(&h, VISITOR).await;

    let result = say(&h, VISITOR, "call me").await;
    assert_eq!(
        result,
        ProcessResult::Dialog {
            chat_id: VISITOR,
            state: State::RequestPhone,
            lead_captured: false,
        }
    );
    assert!(h.store.leads().await.is_empty());
}

#[tokio::test]
async fn test_second_message_after_capture_makes_no_new_lead() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    qualify(&h, VISITOR).await;
    say(&h, VISITOR, "+79991234567").await;
    say(&h, VISITOR, "+79990000000").await;

    assert_eq!(h.store.leads().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_cancels_pending_reset() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    qualify(&h, VISITOR).await;
    say(&h, VISITOR, "+79991234567").await;

    say(&h, VISITOR, "/start").await;
    say(&h, VISITOR, "Хочу").await;
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::Purpose));
}

#[tokio::test]
async fn test_funnel_records_every_step() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    qualify(&h, VISITOR).await;
    qualify(&h, ChatId(8)).await;
    say(&h, VISITOR, "+79991234567").await;

    let counts = h.store.counts().await.unwrap();
    assert_eq!(counts[&State::Intro], 2);
    assert_eq!(counts[&State::RequestPhone], 2);
    assert_eq!(counts[&State::LeadSaved], 1);
    assert!(!counts.contains_key(&State::Start));
}

#[tokio::test]
async fn test_visitors_are_registered_admins_are_not() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    say(&h, VISITOR, "/start").await;
    say(&h, ADMIN, "/admin").await;

    assert_eq!(h.store.list_chat_ids().await.unwrap(), vec![VISITOR]);
}

#[tokio::test]
async fn test_admin_command_denied_for_visitor() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    let result = say(&h, VISITOR, "/admin").await;

    assert_eq!(result, ProcessResult::Denied { chat_id: VISITOR });
    assert_eq!(h.sender.texts_to(VISITOR).await, vec![ACCESS_DENIED]);
    assert_eq!(h.dispatcher.session_state(VISITOR).await, None);
}

#[tokio::test]
async fn test_admin_broadcast_reaches_visitors() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new().failing_for([ChatId(9)]));
    for id in [7, 8, 9] {
        say(&h, ChatId(id), "/start").await;
    }
    h.sender.clear().await;

    say(&h, ADMIN, "/admin").await;
    assert_eq!(h.sender.texts_to(ADMIN).await, vec![ADMIN_MENU]);

    say(&h, ADMIN, CREATE_BROADCAST).await;
    say(&h, ADMIN, "Скидки до конца недели").await;
    say(&h, ADMIN, "Отправить").await;

    let texts = h.sender.texts_to(ADMIN).await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some("Рассылка отправлена: 2 успешно, 1 с ошибками.")
    );
    assert_eq!(
        h.sender.texts_to(ChatId(8)).await,
        vec!["Скидки до конца недели"]
    );

    let stats = h.store.stats().await;
    assert_eq!((stats[0].total, stats[0].sent, stats[0].failed), (3, 2, 1));

    say(&h, ADMIN, SHOW_STATS).await;
    let texts = h.sender.texts_to(ADMIN).await;
    assert!(texts.last().unwrap().starts_with("Последние рассылки:\n1) "));
}

#[tokio::test]
async fn test_menu_commands_not_broadcast_while_composing() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    say(&h, VISITOR, "/start").await;
    h.sender.clear().await;

    say(&h, ADMIN, CREATE_BROADCAST).await;
    say(&h, ADMIN, SHOW_STATS).await;
    let texts = h.sender.texts_to(ADMIN).await;
    assert_eq!(
        texts.last().map(String::as_str),
        Some("Статистика недоступна или отсутствует")
    );

    // The draft is still composing after the menu command.
    say(&h, ADMIN, "Акция выходного дня").await;
    assert!(h.sender.texts_to(VISITOR).await.is_empty());

    // Starting over while confirming drops the old draft.
    say(&h, ADMIN, CREATE_BROADCAST).await;
    say(&h, ADMIN, "Новые квартиры").await;
    say(&h, ADMIN, "Отправить").await;

    assert_eq!(h.sender.texts_to(VISITOR).await, vec!["Новые квартиры"]);
    assert_eq!(h.store.stats().await.len(), 1);
}

#[tokio::test]
async fn test_admin_photo_broadcast() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    say(&h, VISITOR, "/start").await;

    h.dispatcher
        .handle(InboundEvent::photo(ADMIN, "photo-1", "Новый ЖК"))
        .await;
    say(&h, ADMIN, "Отправить").await;

    match h.sender.last_to(VISITOR).await {
        Some(Sent::Photo { photo, caption, .. }) => {
            assert_eq!(photo, "photo-1");
            assert_eq!(caption, "Новый ЖК");
        }
        other => panic!("expected photo, got {:?}", other),
    }
}

#[tokio::test]
async fn test_funnel_falls_back_to_text_report() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    say(&h, ADMIN, SHOW_FUNNEL).await;
    assert_eq!(
        h.sender.texts_to(ADMIN).await,
        vec!["Данных по воронке пока нет"]
    );

    say(&h, VISITOR, "/start").await;
    say(&h, ADMIN, SHOW_FUNNEL).await;
    let texts = h.sender.texts_to(ADMIN).await;
    assert!(texts.last().unwrap().starts_with("Воронка по шагам:\n- Приветствие: 1 |"));
}

#[tokio::test]
async fn test_funnel_chart_when_supported() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new().with_charts());
    say(&h, VISITOR, "/start").await;
    say(&h, ADMIN, SHOW_FUNNEL).await;

    match h.sender.last_to(ADMIN).await {
        Some(Sent::Chart { labels, values, .. }) => {
            assert_eq!(labels.len(), 6);
            assert_eq!(values[0], 1);
        }
        other => panic!("expected chart, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failing_storage_still_acknowledges() {
    let sender = Arc::new(RecordingSender::new());
    let dispatcher = Dispatcher::new(
        Arc::new(FailingStore),
        sender.clone(),
        Dialog::new(DialogScript::default(), PhoneStepPolicy::Direct),
        AdminPolicy::default(),
        DispatcherConfig::default(),
    );

    for text in ["/start", "Хочу", "Для себя", "1 спальня", "Трейд-ин", "+79991234567"] {
        dispatcher.handle(InboundEvent::text(VISITOR, text)).await;
    }

    assert_eq!(
        sender.texts_to(VISITOR).await.last().map(String::as_str),
        Some(DialogScript::default().lead_ack.as_str())
    );
}

#[tokio::test]
async fn test_broadcast_recipient_failure_reported() {
    let sender = Arc::new(RecordingSender::new());
    let store = Arc::new(MemoryStore::new());
    let campaigns = CampaignManager::new(Arc::new(FailingStore), sender.clone(), store.clone());
    let dispatcher = Dispatcher::new(
        store,
        sender.clone(),
        Dialog::default(),
        AdminPolicy::new([ADMIN]),
        DispatcherConfig::default(),
    )
    .with_campaigns(campaigns);

    for text in [CREATE_BROADCAST, "Текст", "Отправить"] {
        dispatcher.handle(InboundEvent::text(ADMIN, text)).await;
    }

    assert_eq!(
        sender.texts_to(ADMIN).await.last().map(String::as_str),
        Some("Не удалось получить список пользователей")
    );
}

#[tokio::test(start_paused = true)]
async fn test_idle_sessions_swept() {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::new(
        store,
        Arc::new(RecordingSender::new()),
        Dialog::default(),
        AdminPolicy::default(),
        DispatcherConfig {
            idle_timeout: Duration::from_secs(60),
            ..Default::default()
        },
    );

    dispatcher.handle(InboundEvent::text(VISITOR, "/start")).await;
    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(dispatcher.sweep_idle().await, 1);
    assert_eq!(dispatcher.session_state(VISITOR).await, None);
}

#[tokio::test]
async fn test_run_stops_when_stream_ends() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    let events = futures::stream::iter(vec![
        InboundEvent::text(VISITOR, "/start"),
        InboundEvent::text(VISITOR, "Хочу"),
    ]);

    let result = h.dispatcher.run(events).await;
    assert!(matches!(result, Err(DispatchError::StreamEnded)));
    assert_eq!(h.dispatcher.session_state(VISITOR).await, Some(State::Purpose));
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let h = harness(PhoneStepPolicy::Direct, RecordingSender::new());
    let (_tx, rx) = tokio::sync::mpsc::channel::<InboundEvent>(4);
    let events = tokio_stream::wrappers::ReceiverStream::new(rx);

    let result = h.dispatcher.run_with_shutdown(events, async {}).await;
    assert!(result.is_ok());
}
