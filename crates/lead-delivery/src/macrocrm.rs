//! MacroCRM estate request client.

use async_trait::async_trait;
use bot_core::{DeliveryError, Lead, LeadDelivery};
use chrono::Utc;
use md5::{Digest, Md5};
use reqwest::Client;
use tracing::{debug, info};

use crate::config::MacroCrmConfig;

/// Response bodies longer than this are cut in error messages.
const MAX_ERROR_BODY: usize = 2048;

/// Posts leads to the MacroCRM `estate/request` endpoint.
#[derive(Debug, Clone)]
pub struct MacroCrmClient {
    client: Client,
    config: MacroCrmConfig,
}

impl MacroCrmClient {
    /// Create a client. Fails if the domain or secret is missing.
    pub fn new(config: MacroCrmConfig) -> Result<Self, DeliveryError> {
        if config.domain.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("MacroCRM domain is empty".to_string()));
        }
        if config.app_secret.trim().is_empty() {
            return Err(DeliveryError::NotConfigured("MacroCRM app secret is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DeliveryError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(domain = %config.domain, url = %config.request_url(), "MacroCRM client initialized");

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MacroCrmConfig {
        &self.config
    }

    /// Form fields for one request, signed for the given unix time.
    pub fn form_fields(&self, lead: &Lead, time: i64) -> Vec<(&'static str, String)> {
        let time = time.to_string();
        let token = sign(&self.config.domain, &time, &self.config.app_secret);
        vec![
            ("domain", self.config.domain.clone()),
            ("time", time),
            ("token", token),
            ("action", self.config.action.clone()),
            ("phone", lead.phone.clone()),
            ("name", self.config.contact_name.clone()),
            ("message", lead_message(lead)),
        ]
    }
}

#[async_trait]
impl LeadDelivery for MacroCrmClient {
    async fn send_lead(&self, lead: &Lead) -> Result<(), DeliveryError> {
        if lead.phone.trim().is_empty() {
            return Err(DeliveryError::InvalidLead("phone is empty".to_string()));
        }

        let form = self.form_fields(lead, Utc::now().timestamp());
        debug!(chat_id = %lead.chat_id, "Posting lead to MacroCRM");

        let response = self
            .client
            .post(self.config.request_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Transport(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY).to_string(),
            });
        }

        info!(chat_id = %lead.chat_id, status = status.as_u16(), "Lead delivered to MacroCRM");
        Ok(())
    }
}

/// Request signature: hex MD5 of domain, time and secret concatenated.
pub fn sign(domain: &str, time: &str, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(domain.as_bytes());
    hasher.update(time.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn lead_message(lead: &Lead) -> String {
    format!(
        "Заявка из Telegram\nЦель: {}\nСпальни: {}\nОплата: {}",
        lead.purpose, lead.bedroom_count, lead.payment_method
    )
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Form, Router};
    use bot_core::ChatId;
    use tokio::sync::Mutex;

    fn lead() -> Lead {
        Lead {
            chat_id: ChatId(42),
            purpose: "Для себя".to_string(),
            bedroom_count: "1 спальня".to_string(),
            payment_method: "Ипотека".to_string(),
            phone: "+79991234567".to_string(),
            created_at: Utc::now(),
        }
    }

    fn config(base_url: String) -> MacroCrmConfig {
        MacroCrmConfig {
            base_url,
            domain: "example.ru".to_string(),
            app_secret: "secret".to_string(),
            ..Default::default()
        }
    }

    type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn serve(status: StatusCode, body: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/estate/request/",
                post(
                    move |State(captured): State<Captured>,
                          Form(form): Form<HashMap<String, String>>| async move {
                        captured.lock().await.push(form);
                        (status, body)
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    #[test]
    fn test_sign_is_md5_of_concatenation() {
        assert_eq!(sign("a", "b", "c"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(sign("", "", ""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_missing_secret_is_not_configured() {
        let err = MacroCrmClient::new(MacroCrmConfig {
            domain: "example.ru".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured(_)));
    }

    #[test]
    fn test_form_fields() {
        let client = MacroCrmClient::new(config("http://localhost".to_string())).unwrap();
        let form: HashMap<_, _> = client.form_fields(&lead(), 1700000000).into_iter().collect();

        assert_eq!(form["domain"], "example.ru");
        assert_eq!(form["time"], "1700000000");
        assert_eq!(form["token"], sign("example.ru", "1700000000", "secret"));
        assert_eq!(form["action"], "question");
        assert_eq!(
            form["message"],
            "Заявка из Telegram\nЦель: Для себя\nСпальни: 1 спальня\nОплата: Ипотека"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let s = "ж".repeat(10);
        assert_eq!(truncate(&s, 5), "жж");
        assert_eq!(truncate("short", 100), "short");
    }

    #[tokio::test]
    async fn test_send_lead_posts_form() {
        let (base, captured) = serve(StatusCode::OK, "{}").await;
        let client = MacroCrmClient::new(config(base)).unwrap();

        client.send_lead(&lead()).await.unwrap();

        let forms = captured.lock().await;
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0]["phone"], "+79991234567");
        assert_eq!(forms[0]["domain"], "example.ru");
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let (base, _) = serve(StatusCode::BAD_REQUEST, "bad token").await;
        let client = MacroCrmClient::new(config(base)).unwrap();

        let err = client.send_lead(&lead()).await.unwrap_err();
        match err {
            DeliveryError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_phone_rejected() {
        let client = MacroCrmClient::new(config("http://localhost".to_string())).unwrap();
        let mut lead = lead();
        lead.phone = "  ".to_string();

        let err = client.send_lead(&lead).await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidLead(_)));
    }
}
