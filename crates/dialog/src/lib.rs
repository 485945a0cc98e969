//! Qualification dialog for the lead funnel bot.
//!
//! The [`Dialog`] walks a visitor through a fixed script (purpose, bedrooms,
//! payment, phone) and returns a [`Reply`] describing what to send next. It
//! is pure logic over a borrowed [`Session`]; side effects such as saving the
//! lead are left to the caller, signalled by [`Reply::lead_captured`].
//!
//! # Example
//!
//! ```rust
//! use bot_core::{Payload, State};
//! use dialog::{Dialog, Session};
//!
//! let dialog = Dialog::default();
//! let mut session = Session::default();
//!
//! let reply = dialog.handle(&mut session, &Payload::Text("/start".into()));
//! assert_eq!(session.state, State::Intro);
//! assert_eq!(reply.options, vec!["Хочу".to_string()]);
//! ```

mod dialog;
mod phone;
mod script;
mod session;

pub use dialog::{Dialog, RESTART_COMMAND};
pub use phone::looks_like_phone;
pub use script::{DialogScript, PhoneStepPolicy, ScriptError};
pub use session::{Reply, Session};
