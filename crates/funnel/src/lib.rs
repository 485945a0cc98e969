//! Funnel analytics for the lead funnel bot.
//!
//! [`FunnelAnalytics`] records which milestones each chat has reached and
//! renders step-over-step conversion, either as a text [`FunnelReport`] or as
//! a [`ChartSeries`] for a charting collaborator.
//!
//! # Example
//!
//! ```rust,ignore
//! let funnel = FunnelAnalytics::new(store);
//! funnel.reach(ChatId(1), State::Intro).await?;
//!
//! match funnel.report().await {
//!     Some(report) => println!("{report}"),
//!     None => println!("{NO_FUNNEL_DATA}"),
//! }
//! ```

mod report;

use std::collections::HashMap;
use std::sync::Arc;

use bot_core::{ChatId, FunnelStore, State, StoreError};
use tracing::{debug, warn};

pub use report::{ChartSeries, FunnelReport, FunnelRow, BAR_WIDTH, NO_FUNNEL_DATA};

/// Milestones shown in reports, in funnel order.
pub const MILESTONES: [State; 6] = [
    State::Intro,
    State::Purpose,
    State::Bedrooms,
    State::Payment,
    State::RequestPhone,
    State::LeadSaved,
];

/// Human-readable milestone label.
pub fn label(state: State) -> &'static str {
    match state {
        State::Start => "Старт",
        State::Intro => "Приветствие",
        State::Purpose => "Цель",
        State::Bedrooms => "Спальни",
        State::Payment => "Оплата",
        State::FinalMessage => "Оффер и каталог",
        State::RequestPhone => "Запрос номера",
        State::LeadSaved => "Лид",
    }
}

/// Funnel analytics over a [`FunnelStore`].
#[derive(Clone)]
pub struct FunnelAnalytics {
    store: Arc<dyn FunnelStore>,
}

impl FunnelAnalytics {
    pub fn new(store: Arc<dyn FunnelStore>) -> Self {
        Self { store }
    }

    /// Record that a chat reached a milestone.
    ///
    /// [`State::Start`] is not a milestone and is ignored.
    pub async fn reach(&self, chat_id: ChatId, state: State) -> Result<(), StoreError> {
        if state == State::Start {
            return Ok(());
        }
        debug!(chat_id = %chat_id, state = %state, "Funnel reach");
        self.store.hit(state, chat_id).await
    }

    /// Distinct chat counts per milestone. Store failures yield an empty map.
    pub async fn counts(&self) -> HashMap<State, u64> {
        match self.store.counts().await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, "Failed to load funnel counts");
                HashMap::new()
            }
        }
    }

    /// Build the conversion report, or `None` when nothing was recorded.
    pub async fn report(&self) -> Option<FunnelReport> {
        let counts = self.counts().await;
        let values: Vec<u64> = MILESTONES
            .iter()
            .map(|state| counts.get(state).copied().unwrap_or(0))
            .collect();
        FunnelReport::build(&MILESTONES, &values)
    }

    /// Labels and counts in milestone order.
    pub async fn chart_series(&self) -> ChartSeries {
        let counts = self.counts().await;
        ChartSeries {
            labels: MILESTONES.iter().map(|s| label(*s).to_string()).collect(),
            values: MILESTONES
                .iter()
                .map(|s| counts.get(s).copied().unwrap_or(0))
                .collect(),
        }
    }
}
