//! Per-session list of scored attempts.

use tracing::info;

use crate::scoring::{ScoreSummary, Tally};

/// Every summary recorded during a session, plus the time spent in scored
/// attempts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLedger {
    summaries: Vec<ScoreSummary>,
    total_time_secs: f64,
}

impl SessionLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished attempt.
    pub fn record(&mut self, summary: ScoreSummary) {
        self.total_time_secs += summary.time_elapsed_seconds;
        self.summaries.push(summary);
    }

    /// Void the totals of every recorded attempt. Category breakdowns and
    /// the list itself are kept.
    pub fn exit_scenario(&mut self) {
        for summary in &mut self.summaries {
            summary.total_points = 0;
            summary.total_max = 0;
        }
        info!(attempts = self.summaries.len(), "scenario totals voided");
    }

    /// Summaries in the order they were recorded.
    pub fn summaries(&self) -> &[ScoreSummary] {
        &self.summaries
    }

    /// The most recent summary.
    pub fn last(&self) -> Option<&ScoreSummary> {
        self.summaries.last()
    }

    /// Sum of the per-attempt totals, saturating at the `i32` bounds.
    pub fn totals(&self) -> Tally {
        self.summaries.iter().fold(Tally::default(), |acc, s| {
            Tally::new(
                acc.earned.saturating_add(s.total_points),
                acc.max.saturating_add(s.total_max),
            )
        })
    }

    /// Seconds spent in scored attempts.
    pub fn total_time_secs(&self) -> f64 {
        self.total_time_secs
    }

    /// Number of recorded attempts.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
