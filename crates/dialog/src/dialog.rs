//! The qualification state machine.

use bot_core::{Payload, State};
use tracing::debug;

use crate::phone::looks_like_phone;
use crate::script::{DialogScript, PhoneStepPolicy};
use crate::session::{Reply, Session};

/// Command that restarts the dialog from any state.
pub const RESTART_COMMAND: &str = "/start";

/// Stateless dialog logic; all progress lives in the [`Session`].
#[derive(Debug, Clone, Default)]
pub struct Dialog {
    script: DialogScript,
    policy: PhoneStepPolicy,
}

impl Dialog {
    pub fn new(script: DialogScript, policy: PhoneStepPolicy) -> Self {
        Self { script, policy }
    }

    pub fn script(&self) -> &DialogScript {
        &self.script
    }

    pub fn policy(&self) -> PhoneStepPolicy {
        self.policy
    }

    /// Handle one inbound payload and mutate the session accordingly.
    ///
    /// Inputs a step does not accept leave the session untouched and
    /// re-prompt with the same options.
    pub fn handle(&self, session: &mut Session, input: &Payload) -> Reply {
        let text = match input {
            Payload::Text(text) => text.as_str(),
            _ => "",
        };

        if text.trim() == RESTART_COMMAND || session.state == State::Start {
            return self.restart(session);
        }

        let s = &self.script;
        match session.state {
            State::Start => self.restart(session),

            State::Intro => {
                if text == s.start_button {
                    session.state = State::Purpose;
                    let mut reply =
                        Reply::ask(&s.purpose_question, &s.purpose_options, State::Purpose);
                    reply.preface = Some(s.intro_notice.clone());
                    reply
                } else {
                    Reply::reprompt(&s.intro_hint, std::slice::from_ref(&s.start_button))
                }
            }

            State::Purpose => match pick(&s.purpose_options, text) {
                Some(choice) => {
                    session.purpose = Some(choice);
                    session.state = State::Bedrooms;
                    Reply::ask(&s.bedrooms_question, &s.bedrooms_options, State::Bedrooms)
                }
                None => self.rejected(session, &s.purpose_hint, &s.purpose_options),
            },

            State::Bedrooms => match pick(&s.bedrooms_options, text) {
                Some(choice) => {
                    session.bedroom_count = Some(choice);
                    session.state = State::Payment;
                    Reply::ask(&s.payment_question, &s.payment_options, State::Payment)
                }
                None => self.rejected(session, &s.bedrooms_hint, &s.bedrooms_options),
            },

            State::Payment => match pick(&s.payment_options, text) {
                Some(choice) => {
                    let explicit_offer = s.offers.get(&choice).cloned();
                    let offer = s.offer_for(&choice).to_string();
                    session.payment_method = Some(choice);
                    match self.policy {
                        PhoneStepPolicy::ChannelChoice => {
                            session.state = State::FinalMessage;
                            let mut reply = Reply::ask(
                                &s.channel_question,
                                &s.channel_options(),
                                State::FinalMessage,
                            );
                            reply.preface = explicit_offer;
                            reply
                        }
                        PhoneStepPolicy::Direct => {
                            let mut reply = self.request_phone(session);
                            reply.preface = Some(offer);
                            reply
                        }
                    }
                }
                None => self.rejected(session, &s.payment_hint, &s.payment_options),
            },

            State::FinalMessage => {
                if text == s.channel_info_option {
                    Reply {
                        text: s.channel_info_text.clone(),
                        remove_keyboard: true,
                        ..Default::default()
                    }
                } else if text == s.channel_expert_option {
                    self.request_phone(session)
                } else {
                    self.rejected(session, &s.channel_hint, &s.channel_options())
                }
            }

            State::RequestPhone => {
                let candidate = match input {
                    Payload::Contact { phone } if !phone.trim().is_empty() => {
                        Some(phone.trim().to_string())
                    }
                    Payload::Text(raw) if looks_like_phone(raw) => Some(raw.trim().to_string()),
                    _ => None,
                };
                match candidate {
                    Some(phone) => {
                        session.phone = Some(phone);
                        session.state = State::LeadSaved;
                        Reply {
                            text: s.lead_ack.clone(),
                            advance_to: Some(State::LeadSaved),
                            remove_keyboard: true,
                            lead_captured: true,
                            ..Default::default()
                        }
                    }
                    None => {
                        debug!(state = %session.state, "phone rejected");
                        Reply::reprompt(&s.phone_invalid, &[])
                    }
                }
            }

            State::LeadSaved => Reply {
                text: s.lead_already_saved.clone(),
                remove_keyboard: true,
                ..Default::default()
            },
        }
    }

    fn restart(&self, session: &mut Session) -> Reply {
        *session = Session {
            state: State::Intro,
            ..Default::default()
        };
        Reply::ask(
            &self.script.greeting,
            std::slice::from_ref(&self.script.start_button),
            State::Intro,
        )
    }

    fn request_phone(&self, session: &mut Session) -> Reply {
        session.state = State::RequestPhone;
        Reply {
            text: self.script.phone_request.clone(),
            advance_to: Some(State::RequestPhone),
            request_contact: Some(self.script.contact_button.clone()),
            ..Default::default()
        }
    }

    fn rejected(&self, session: &Session, hint: &str, options: &[String]) -> Reply {
        debug!(state = %session.state, "option rejected");
        Reply::reprompt(hint, options)
    }
}

fn pick(options: &[String], text: &str) -> Option<String> {
    options.iter().find(|o| o.as_str() == text).cloned()
}
