//! Scenario scoring.
//!
//! At the end of an attempt every element of the scenario is walked once.
//! Elements in a scoring bucket add their score to the bucket maximum, and
//! to the earned total if they were visited. Timing points come from the
//! scenario's timing table.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::{Element, ElementId, Scenario, ScoreBucket, VisibleSet, VisitLog};
use tt_dialogue::BedStatusAsked;

/// Timestamp layout used for visits and session start times.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Earned and maximum points. Sums saturate at the `i32` bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Points earned.
    pub earned: i32,
    /// Points available.
    pub max: i32,
}

impl Tally {
    /// A tally from raw values.
    pub fn new(earned: i32, max: i32) -> Self {
        Self { earned, max }
    }

    fn count(&mut self, score: i32, visited: bool) {
        self.max = self.max.saturating_add(score);
        if visited {
            self.earned = self.earned.saturating_add(score);
        }
    }

    fn add(self, other: Tally) -> Tally {
        Tally::new(
            self.earned.saturating_add(other.earned),
            self.max.saturating_add(other.max),
        )
    }
}

/// An element as it stood when the attempt was scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ElementSnapshot {
    /// Category name.
    pub category: String,
    /// Learner triple, empty if none.
    pub learner_response: Vec<String>,
    /// Match keywords.
    pub matches: Vec<String>,
    /// Answer triple, empty if none.
    pub answer: Vec<String>,
    /// Score weight.
    pub score: i32,
    /// Visit timestamps; empty if never visited.
    pub visited: Vec<String>,
    /// Trigger names.
    pub function: Vec<String>,
}

impl ElementSnapshot {
    /// Snapshot `element` with its visits from `visits`.
    pub fn capture(element: &Element, visits: &VisitLog) -> Self {
        Self {
            category: element.category.to_string(),
            learner_response: element
                .learner_response
                .as_ref()
                .map(|u| u.to_parts())
                .unwrap_or_default(),
            matches: element.matches.clone(),
            answer: element.answer.as_ref().map(|u| u.to_parts()).unwrap_or_default(),
            score: element.score,
            visited: visits
                .visits(element.id)
                .iter()
                .map(|at| format_timestamp(*at))
                .collect(),
            function: element.triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Format a time with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Scores for one finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Scenario display name.
    #[serde(rename = "scenarioName")]
    pub scenario_name: String,
    /// Present-illness history earned.
    #[serde(rename = "PresentIllnessHistoryEarned")]
    pub present_illness_history_earned: i32,
    /// Present-illness history available.
    #[serde(rename = "PresentIllnessHistoryMax")]
    pub present_illness_history_max: i32,
    /// Elicited history earned.
    #[serde(rename = "ElicitedHistoryEarned")]
    pub elicited_history_earned: i32,
    /// Elicited history available.
    #[serde(rename = "ElicitedHistoryMax")]
    pub elicited_history_max: i32,
    /// Interventions earned, both intervention categories.
    #[serde(rename = "InterventionsEarned")]
    pub interventions_earned: i32,
    /// Interventions available.
    #[serde(rename = "InterventionsMax")]
    pub interventions_max: i32,
    /// Disposition earned.
    #[serde(rename = "ActionsEarned")]
    pub actions_earned: i32,
    /// Disposition available.
    #[serde(rename = "ActionsMax")]
    pub actions_max: i32,
    /// Timing points earned.
    #[serde(rename = "TimingPointsEarned")]
    pub timing_points_earned: i32,
    /// Best timing points, the first table row.
    #[serde(rename = "TimingPointsMax")]
    pub timing_points_max: i32,
    /// Sum of every earned value.
    #[serde(rename = "TotalPoints")]
    pub total_points: i32,
    /// Sum of every max value.
    #[serde(rename = "TotalMax")]
    pub total_max: i32,
    /// Attempt duration in seconds.
    #[serde(rename = "timeElapsedSeconds")]
    pub time_elapsed_seconds: f64,
    /// When bed status was asked.
    #[serde(rename = "BedStatusAsked")]
    pub bed_status_asked: BedStatusAsked,
    /// Elements visible at scoring time, in visible order.
    #[serde(rename = "VisibleElements")]
    pub visible_elements: Vec<ElementSnapshot>,
}

impl ScoreSummary {
    /// Earned and max for one category bucket.
    pub fn bucket(&self, bucket: ScoreBucket) -> Tally {
        match bucket {
            ScoreBucket::PresentIllnessHistory => Tally::new(
                self.present_illness_history_earned,
                self.present_illness_history_max,
            ),
            ScoreBucket::ElicitedHistory => {
                Tally::new(self.elicited_history_earned, self.elicited_history_max)
            }
            ScoreBucket::Interventions => {
                Tally::new(self.interventions_earned, self.interventions_max)
            }
            ScoreBucket::Actions => Tally::new(self.actions_earned, self.actions_max),
        }
    }

    /// Timing earned and max.
    pub fn timing(&self) -> Tally {
        Tally::new(self.timing_points_earned, self.timing_points_max)
    }

    /// Grand total for the attempt.
    pub fn total(&self) -> Tally {
        Tally::new(self.total_points, self.total_max)
    }

    /// Points for information gathered: history and interventions.
    pub fn question_score(&self) -> i32 {
        self.present_illness_history_earned
            .saturating_add(self.elicited_history_earned)
            .saturating_add(self.interventions_earned)
    }

    /// Points for the disposition decision.
    pub fn decision_score(&self) -> i32 {
        self.actions_earned
    }
}

/// Everything scoring reads from a finished attempt.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    /// The scenario played.
    pub scenario: &'a Scenario,
    /// Visible set at the end of the attempt.
    pub visible: &'a VisibleSet,
    /// Visits made during the attempt.
    pub visits: &'a VisitLog,
    /// Attempt duration in seconds.
    pub elapsed_secs: f64,
    /// When bed status was asked.
    pub bed_status: BedStatusAsked,
}

/// Score an attempt.
pub fn score(input: ScoringInput<'_>) -> ScoreSummary {
    let tree = &input.scenario.tree;

    // Every element of the tree, plus anything visible that the walk missed.
    let mut ids: Vec<ElementId> = tree.flatten();
    let mut seen: HashSet<ElementId> = ids.iter().copied().collect();
    ids.extend(input.visible.iter().filter(|id| seen.insert(*id)));

    let mut pih = Tally::default();
    let mut eh = Tally::default();
    let mut interventions = Tally::default();
    let mut actions = Tally::default();

    for element in ids.iter().filter_map(|&id| tree.get(id)) {
        let visited = input.visits.is_visited(element.id);
        match element.category.score_bucket() {
            Some(ScoreBucket::PresentIllnessHistory) => pih.count(element.score, visited),
            Some(ScoreBucket::ElicitedHistory) => eh.count(element.score, visited),
            Some(ScoreBucket::Interventions) => interventions.count(element.score, visited),
            Some(ScoreBucket::Actions) => actions.count(element.score, visited),
            None => {}
        }
    }

    let timing = Tally::new(
        input.scenario.timing.points_for(input.elapsed_secs),
        input.scenario.timing.max_points(),
    );
    let total = [pih, eh, interventions, actions, timing]
        .into_iter()
        .fold(Tally::default(), Tally::add);

    let visible_elements = input
        .visible
        .iter()
        .filter_map(|id| tree.get(id))
        .map(|element| ElementSnapshot::capture(element, input.visits))
        .collect();

    ScoreSummary {
        scenario_name: input.scenario.name.clone(),
        present_illness_history_earned: pih.earned,
        present_illness_history_max: pih.max,
        elicited_history_earned: eh.earned,
        elicited_history_max: eh.max,
        interventions_earned: interventions.earned,
        interventions_max: interventions.max,
        actions_earned: actions.earned,
        actions_max: actions.max,
        timing_points_earned: timing.earned,
        timing_points_max: timing.max,
        total_points: total.earned,
        total_max: total.max,
        time_elapsed_seconds: input.elapsed_secs,
        bed_status_asked: input.bed_status,
        visible_elements,
    }
}
