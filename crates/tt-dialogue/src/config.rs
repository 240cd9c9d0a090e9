//! Configuration for a dialogue session.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tt_core::Utterance;

/// Configuration for a dialogue session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Minimum keyword similarity (exclusive, 0.0-1.0) for a fuzzy match.
    pub fuzzy_threshold: f64,
    /// Seconds between incremental text units.
    pub speaking_delay_secs: f64,
    /// Learner line that connects the call when said to the transfer center.
    /// `None` leaves connecting to the `Connect` trigger alone.
    pub acceptance_phrase: Option<String>,
    /// Learner line recorded as the bed-status question.
    pub bed_status_phrase: String,
    /// Speaker label used for learner lines.
    pub learner_label: String,
    /// Reply when nothing matches before the call is connected.
    pub unconnected_fallback: Utterance,
    /// Reply when nothing matches after the call is connected.
    pub connected_fallback: Utterance,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.4,
            speaking_delay_secs: 0.45,
            acceptance_phrase: None,
            bed_status_phrase: "What's our bed status?".to_string(),
            learner_label: "Learner".to_string(),
            unconnected_fallback: Utterance::new(
                "TransferCenter",
                "Learner",
                "That's something you should ask the OSH",
            ),
            connected_fallback: Utterance::new("OSH", "Learner", "I'm not sure what you mean."),
        }
    }
}

impl DialogueConfig {
    /// Set the fuzzy threshold (clamped to 0.0-1.0).
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the delay between incremental text units (negative values become 0).
    pub fn with_speaking_delay(mut self, secs: f64) -> Self {
        self.speaking_delay_secs = secs.max(0.0);
        self
    }

    /// Learner text that connects the call like a `Connect` trigger.
    pub fn with_acceptance_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.acceptance_phrase = Some(phrase.into());
        self
    }

    /// Learner text that counts as asking for bed status.
    pub fn with_bed_status_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.bed_status_phrase = phrase.into();
        self
    }

    /// Speaker name that marks a line as the learner's.
    pub fn with_learner_label(mut self, label: impl Into<String>) -> Self {
        self.learner_label = label.into();
        self
    }

    /// The delay as a `Duration`.
    pub fn speaking_delay(&self) -> Duration {
        Duration::from_secs_f64(self.speaking_delay_secs.max(0.0))
    }

    /// The fallback reply for the given connection state.
    pub fn fallback(&self, connected: bool) -> &Utterance {
        if connected {
            &self.connected_fallback
        } else {
            &self.unconnected_fallback
        }
    }
}
