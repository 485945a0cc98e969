//! Dialog copy and the payment-to-phone policy.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// How the dialog gets from the payment answer to the phone request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneStepPolicy {
    /// Ask for a contact channel first; only the expert channel leads to the
    /// phone request.
    #[default]
    ChannelChoice,
    /// Show the offer and ask for the phone right away.
    Direct,
}

impl FromStr for PhoneStepPolicy {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "channel" | "channel_choice" | "two_step" => Ok(Self::ChannelChoice),
            "direct" | "one_step" => Ok(Self::Direct),
            other => Err(ScriptError::Invalid(format!(
                "unknown dialog variant: {other}"
            ))),
        }
    }
}

/// Errors loading a dialog script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid script: {0}")]
    Invalid(String),
}

/// All user-facing copy of the dialog.
///
/// Option lists are compared verbatim against inbound text, so they double
/// as the accepted answers for their step. Missing JSON fields fall back to
/// the built-in copy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogScript {
    pub greeting: String,
    pub start_button: String,
    pub intro_hint: String,
    /// Sent right before the first question once the visitor opts in.
    pub intro_notice: String,

    pub purpose_question: String,
    pub purpose_options: Vec<String>,
    pub purpose_hint: String,

    pub bedrooms_question: String,
    pub bedrooms_options: Vec<String>,
    pub bedrooms_hint: String,

    pub payment_question: String,
    pub payment_options: Vec<String>,
    pub payment_hint: String,

    pub channel_question: String,
    pub channel_info_option: String,
    pub channel_expert_option: String,
    pub channel_hint: String,
    pub channel_info_text: String,

    /// Offer shown before the phone request, keyed by payment option.
    pub offers: HashMap<String, String>,
    pub default_offer: String,

    pub phone_request: String,
    pub contact_button: String,
    pub phone_invalid: String,
    pub lead_ack: String,
    pub lead_already_saved: String,
}

impl Default for DialogScript {
    fn default() -> Self {
        Self {
            greeting: "Здравствуйте 👋\n\nСпасибо, что обратились к нам. PLEADA — эксперты в сфере недвижимости, помогаем быстро и удобно находить идеальное жильё.\n\nХотите, чтобы мы подобрали для вас лучшие варианты или отправили расчеты по конкретному предложению?".to_string(),
            start_button: "Хочу".to_string(),
            intro_hint: "Нажмите 'Хочу'".to_string(),
            intro_notice: "Несколько уточняющих вопросов, и мы отправим вам подходящее предложение уже через пару минут.".to_string(),

            purpose_question: "Для кого вы подбираете квартиру?".to_string(),
            purpose_options: strings(&["Для себя", "Для близких", "Для инвестиций"]),
            purpose_hint: "Пожалуйста, выберите вариант".to_string(),

            bedrooms_question: "Сколько спален вы рассматриваете?".to_string(),
            bedrooms_options: strings(&["1 спальня", "2 спальни", "3 и более спален"]),
            bedrooms_hint: "Пожалуйста, выберите количество спален".to_string(),

            payment_question: "Какой способ оплаты планируете?".to_string(),
            payment_options: strings(&[
                "100% собственных средств",
                "Бесплатная рассрочка",
                "Ипотека",
                "Трейд-ин",
            ]),
            payment_hint: "Пожалуйста, выберите способ оплаты".to_string(),

            channel_question: "Где вам комфортнее получить подборку?".to_string(),
            channel_info_option: "В Telegram".to_string(),
            channel_expert_option: "Связаться с экспертом".to_string(),
            channel_hint: "Пожалуйста, выберите канал".to_string(),
            channel_info_text: "Мы работаем со всеми надежными застройщиками в городе и можем подготовить для вас персональную подборку отличных жилых комплексов.".to_string(),

            offers: HashMap::new(),
            default_offer: "Мы работаем со всеми надежными застройщиками в городе и можем подготовить для вас персональную подборку отличных жилых комплексов. При расчетах мы учитываем дополнительные скидки и акции и согласовываем выгодные условия для наших клиентов. Все наши услуги бесплатны 🔥 Вы можете оставить ваш номер и указать удобное время - наш эксперт свяжется с вами! Если вам неудобно говорить по телефону, то наш эксперт может с вами связаться через WhatsApp, мы будем рады обсудить все детали там.".to_string(),

            phone_request: "Оставьте, пожалуйста, номер телефона — удобнее всего нажать кнопку ниже.".to_string(),
            contact_button: "Отправить номер".to_string(),
            phone_invalid: "Похоже, это не номер телефона. Пришлите номер в формате +7XXXXXXXXXX или нажмите кнопку ‘Отправить номер’.".to_string(),
            lead_ack: "Спасибо! Мы получили ваш номер. Наш эксперт свяжется с вами в ближайшее время.".to_string(),
            lead_already_saved: "Мы уже получили ваш номер, эксперт скоро свяжется с вами. Чтобы начать заново, отправьте /start.".to_string(),
        }
    }
}

impl DialogScript {
    /// Load a script from a JSON file, filling gaps with the built-in copy.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a script from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        let script: Self = serde_json::from_str(raw)?;
        script.validate()?;
        Ok(script)
    }

    /// Offer copy for a payment option.
    pub fn offer_for(&self, payment: &str) -> &str {
        self.offers
            .get(payment)
            .map(String::as_str)
            .unwrap_or(&self.default_offer)
    }

    pub fn channel_options(&self) -> Vec<String> {
        vec![
            self.channel_info_option.clone(),
            self.channel_expert_option.clone(),
        ]
    }

    fn validate(&self) -> Result<(), ScriptError> {
        for (name, options) in [
            ("purpose_options", &self.purpose_options),
            ("bedrooms_options", &self.bedrooms_options),
            ("payment_options", &self.payment_options),
        ] {
            if options.is_empty() {
                return Err(ScriptError::Invalid(format!("{name} is empty")));
            }
        }
        if self.channel_info_option == self.channel_expert_option {
            return Err(ScriptError::Invalid(
                "channel options must differ".to_string(),
            ));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_option_counts() {
        let script = DialogScript::default();
        assert_eq!(script.purpose_options.len(), 3);
        assert_eq!(script.bedrooms_options.len(), 3);
        assert_eq!(script.payment_options.len(), 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let script = DialogScript::from_json(
            r#"{"greeting": "Hi", "offers": {"Ипотека": "Mortgage offer"}}"#,
        )
        .unwrap();
        assert_eq!(script.greeting, "Hi");
        assert_eq!(script.start_button, "Хочу");
        assert_eq!(script.offer_for("Ипотека"), "Mortgage offer");
        assert_eq!(script.offer_for("Трейд-ин"), script.default_offer);
    }

    #[test]
    fn test_empty_options_rejected() {
        let err = DialogScript::from_json(r#"{"payment_options": []}"#).unwrap_err();
        assert!(matches!(err, ScriptError::Invalid(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"lead_ack": "Got it"}}"#).unwrap();

        let script = DialogScript::from_json_file(file.path()).unwrap();
        assert_eq!(script.lead_ack, "Got it");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "channel".parse::<PhoneStepPolicy>().unwrap(),
            PhoneStepPolicy::ChannelChoice
        );
        assert_eq!(
            " Direct ".parse::<PhoneStepPolicy>().unwrap(),
            PhoneStepPolicy::Direct
        );
        assert!("sideways".parse::<PhoneStepPolicy>().is_err());
    }
}
