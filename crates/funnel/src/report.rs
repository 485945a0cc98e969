//! Conversion report rendering.

use std::fmt;

use bot_core::State;
use serde::Serialize;

use crate::label;

/// Cells in a report bar.
pub const BAR_WIDTH: u64 = 20;

/// Text shown when no milestone has been reached yet.
pub const NO_FUNNEL_DATA: &str = "Данных по воронке пока нет";

/// One milestone line of a [`FunnelReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelRow {
    pub state: State,
    pub label: &'static str,
    pub count: u64,
    /// Percent of the base milestone, rounded down.
    pub of_base: u64,
    /// Percent of the previous milestone, rounded down.
    pub of_previous: u64,
    pub bar: String,
}

/// Step-over-step conversion for the report milestones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelReport {
    rows: Vec<FunnelRow>,
}

/// Parallel label and value sequences for chart rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl FunnelReport {
    /// Build a report from counts aligned with `states`.
    ///
    /// Returns `None` when every count is zero. The base is the first count,
    /// or the largest count when the first is zero.
    pub fn build(states: &[State], values: &[u64]) -> Option<Self> {
        let max = values.iter().copied().max().unwrap_or(0);
        if max == 0 {
            return None;
        }
        let base = match values.first() {
            Some(&first) if first > 0 => first,
            _ => max,
        };

        let mut rows = Vec::with_capacity(states.len());
        let mut previous: Option<u64> = None;
        for (state, &count) in states.iter().zip(values) {
            let of_previous = match previous {
                None => 100,
                Some(0) => 0,
                Some(prev) => 100 * count / prev,
            };
            rows.push(FunnelRow {
                state: *state,
                label: label(*state),
                count,
                of_base: percent(count, base),
                of_previous,
                bar: bar(count, base),
            });
            previous = Some(count);
        }
        Some(Self { rows })
    }

    pub fn rows(&self) -> &[FunnelRow] {
        &self.rows
    }
}

impl fmt::Display for FunnelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Воронка по шагам:")?;
        for row in &self.rows {
            writeln!(
                f,
                "- {}: {} | {:>3}% от базового | {:>3}% от пред. {}",
                row.label, row.count, row.of_base, row.of_previous, row.bar
            )?;
        }
        Ok(())
    }
}

fn percent(value: u64, base: u64) -> u64 {
    if base == 0 {
        0
    } else {
        100 * value / base
    }
}

fn bar(value: u64, base: u64) -> String {
    if base == 0 {
        return String::new();
    }
    let filled = (BAR_WIDTH * value / base).min(BAR_WIDTH) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH as usize - filled)
    )
}
