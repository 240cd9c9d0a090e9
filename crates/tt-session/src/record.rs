//! The persisted session record.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SessionError, SessionResult};
use crate::ledger::SessionLedger;
use crate::scoring::{ScoreSummary, format_timestamp};

/// Everything recorded about one learner session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Session start, `yyyy-MM-dd HH:mm:ss`.
    pub session_start_time: String,
    /// Learner id as entered.
    pub net_id: String,
    /// Difficulty tag.
    pub difficulty: String,
    /// One summary per scored attempt.
    pub scenario_summaries: Vec<ScoreSummary>,
    /// Sum of attempt totals.
    pub total_earned: i32,
    /// Sum of attempt maxima.
    pub total_max: i32,
    /// Seconds spent in scored attempts.
    pub total_time_seconds: f64,
}

/// Reject learner ids that would act as a path: empty, containing a path
/// separator, or containing `..`.
pub fn validate_learner_id(learner_id: &str) -> SessionResult<()> {
    let bad = learner_id.trim().is_empty()
        || learner_id.contains(['/', '\\'])
        || learner_id.contains("..");
    if bad {
        return Err(SessionError::InvalidLearnerId(learner_id.to_string()));
    }
    Ok(())
}

/// The learner id reduced to `[A-Za-z0-9_-]`, other characters becoming `_`.
fn file_safe(learner_id: &str) -> String {
    let safe: String = learner_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "anonymous".to_string()
    } else {
        safe
    }
}

impl SessionRecord {
    /// Snapshot a ledger into a record.
    pub fn from_ledger(
        ledger: &SessionLedger,
        started_at: DateTime<Utc>,
        learner_id: &str,
        difficulty: &str,
    ) -> Self {
        let totals = ledger.totals();
        Self {
            session_start_time: format_timestamp(started_at),
            net_id: learner_id.to_string(),
            difficulty: difficulty.to_string(),
            scenario_summaries: ledger.summaries().to_vec(),
            total_earned: totals.earned,
            total_max: totals.max,
            total_time_seconds: ledger.total_time_secs(),
        }
    }

    /// `session_<learner>_<yyyyMMddHHmmss>.json`, with the learner id made
    /// safe for use as a single file name.
    pub fn file_name(&self, saved_at: DateTime<Utc>) -> String {
        format!(
            "session_{}_{}.json",
            file_safe(&self.net_id),
            saved_at.format("%Y%m%d%H%M%S")
        )
    }

    /// Pretty-printed JSON, suitable for handing to a download.
    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the record into `dir`, creating it if needed. Returns the path.
    pub fn write_to(&self, dir: &Path, saved_at: DateTime<Utc>) -> SessionResult<PathBuf> {
        let path = dir.join(self.file_name(saved_at));
        let json = self.to_json()?;
        fs::create_dir_all(dir)
            .and_then(|()| fs::write(&path, json))
            .map_err(|source| SessionError::Write {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "session record saved");
        Ok(path)
    }

    /// Plain-text score report.
    pub fn export_text(&self) -> String {
        let mut out = format!(
            "Session {} ({}, {})\n\n",
            self.session_start_time, self.net_id, self.difficulty
        );
        for (i, s) in self.scenario_summaries.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, s.scenario_name));
            out.push_str(&format!(
                "   Questions: {}  Decision: {}  Timing: {}/{}\n",
                s.question_score(),
                s.decision_score(),
                s.timing_points_earned,
                s.timing_points_max
            ));
            out.push_str(&format!(
                "   Total: {}/{} in {:.1}s\n",
                s.total_points, s.total_max, s.time_elapsed_seconds
            ));
        }
        out.push_str(&format!(
            "\nSession total: {}/{} in {:.1}s\n",
            self.total_earned, self.total_max, self.total_time_seconds
        ));
        out
    }
}
