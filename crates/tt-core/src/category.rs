use std::fmt;

use serde::{Deserialize, Serialize};

/// The topic an element belongs to. Unrecognized names are kept verbatim in
/// `Custom` so that scenario authors can add topics without a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Lines delivered when the scenario starts.
    Opening,
    /// Conversation with the transfer center before the call is connected.
    TransferCenter,
    /// History of the present illness, asked of the referring hospital.
    PresentIllnessHistory,
    /// History drawn out by follow-up questions.
    ElicitedHistory,
    /// Exam findings, labs and imaging.
    ExamsLabsImaging,
    /// Treatment already given at the referring hospital.
    PriorInterventions,
    /// Treatment the learner recommends before transfer.
    RecommendInterventions,
    /// Scored interventions.
    Interventions,
    /// Scored interventions and recommendations (same bucket as `Interventions`).
    InterventionsAndRecommendations,
    /// The learner's admission decision.
    Disposition,
    /// Patient vitals panel content (flat JSON object in the answer text).
    VitalSigns,
    /// Lab results panel content (flat JSON object in the answer text).
    LabResult,
    /// A topic not known to the engine.
    Custom(String),
}

/// Score buckets reported in a scenario summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreBucket {
    /// `PresentIllnessHistory` elements.
    PresentIllnessHistory,
    /// `ElicitedHistory` elements.
    ElicitedHistory,
    /// `Interventions` and `InterventionsAndRecommendations` elements.
    Interventions,
    /// `Disposition` elements.
    Actions,
}

impl Category {
    /// Parse a category name as written in scenario files.
    pub fn parse(s: &str) -> Self {
        match s {
            "Opening" => Self::Opening,
            "TransferCenter" => Self::TransferCenter,
            "PresentIllnessHistory" => Self::PresentIllnessHistory,
            "ElicitedHistory" => Self::ElicitedHistory,
            "ExamsLabsImaging" => Self::ExamsLabsImaging,
            "PriorInterventions" => Self::PriorInterventions,
            "RecommendInterventions" => Self::RecommendInterventions,
            "Interventions" => Self::Interventions,
            "InterventionsAndRecommendations" => Self::InterventionsAndRecommendations,
            "Disposition" => Self::Disposition,
            "VitalSigns" => Self::VitalSigns,
            "LabResult" => Self::LabResult,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The name used in scenario files.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opening => "Opening",
            Self::TransferCenter => "TransferCenter",
            Self::PresentIllnessHistory => "PresentIllnessHistory",
            Self::ElicitedHistory => "ElicitedHistory",
            Self::ExamsLabsImaging => "ExamsLabsImaging",
            Self::PriorInterventions => "PriorInterventions",
            Self::RecommendInterventions => "RecommendInterventions",
            Self::Interventions => "Interventions",
            Self::InterventionsAndRecommendations => "InterventionsAndRecommendations",
            Self::Disposition => "Disposition",
            Self::VitalSigns => "VitalSigns",
            Self::LabResult => "LabResult",
            Self::Custom(s) => s,
        }
    }

    /// Topics a learner can pick from, in menu order.
    pub fn topics() -> [Category; 6] {
        [
            Self::TransferCenter,
            Self::PresentIllnessHistory,
            Self::ExamsLabsImaging,
            Self::PriorInterventions,
            Self::RecommendInterventions,
            Self::Disposition,
        ]
    }

    /// Case-insensitive lookup used by text front ends.
    pub fn from_topic_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase().replace([' ', '_', '-'], "");
        Self::topics()
            .into_iter()
            .find(|topic| topic.as_str().to_lowercase() == wanted)
    }

    /// Whether this is the empty (unselected) topic.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Custom(s) if s.is_empty())
    }

    /// Whether this is the pre-connection transfer center topic.
    pub fn is_transfer_center(&self) -> bool {
        matches!(self, Self::TransferCenter)
    }

    /// The bucket this category scores into, if any.
    pub fn score_bucket(&self) -> Option<ScoreBucket> {
        match self {
            Self::PresentIllnessHistory => Some(ScoreBucket::PresentIllnessHistory),
            Self::ElicitedHistory => Some(ScoreBucket::ElicitedHistory),
            Self::Interventions | Self::InterventionsAndRecommendations => {
                Some(ScoreBucket::Interventions)
            }
            Self::Disposition => Some(ScoreBucket::Actions),
            _ => None,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
