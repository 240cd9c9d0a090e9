use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::element::{Element, ElementDef, ElementId};
use crate::error::{ScenarioError, ScenarioResult};
use crate::tree::ElementTree;

/// One row of a timing table: finishing within `time_seconds` earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingPoint {
    /// Elapsed-time threshold in seconds.
    pub time_seconds: f64,
    /// Points awarded within the threshold.
    pub points: i32,
}

/// Timing rows in stored order, tightest threshold first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimingTable(pub Vec<TimingPoint>);

impl TimingTable {
    /// Wrap rows as stored; no sorting happens here.
    pub fn new(rows: Vec<TimingPoint>) -> Self {
        Self(rows)
    }

    /// Points for an attempt that took `elapsed` seconds: the first row
    /// whose threshold is not exceeded, or 0.
    pub fn points_for(&self, elapsed: f64) -> i32 {
        self.0
            .iter()
            .find(|row| elapsed <= row.time_seconds)
            .map_or(0, |row| row.points)
    }

    /// The best achievable timing score: the first row's points.
    pub fn max_points(&self) -> i32 {
        self.0.first().map_or(0, |row| row.points)
    }

    /// Rows run from highest reward to lowest.
    pub fn is_sorted_by_reward(&self) -> bool {
        self.0.windows(2).all(|w| w[0].points >= w[1].points)
    }

    /// All rows in stored order.
    pub fn rows(&self) -> &[TimingPoint] {
        &self.0
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scenario file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScenarioFile {
    /// Display name.
    #[serde(default)]
    pub scenario_name: String,
    /// Top-level elements; absent means an empty tree.
    #[serde(default)]
    pub elements: Option<Vec<ElementDef>>,
    /// Timing rows; absent means no timing score.
    #[serde(default)]
    pub timing_points_map: Option<Vec<TimingPoint>>,
}

/// A loaded scenario: immutable content shared by every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Numeric id taken from the file name.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Element arena.
    pub tree: ElementTree,
    /// Timing score rows.
    pub timing: TimingTable,
}

impl Scenario {
    /// Assemble a scenario from parts.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        tree: ElementTree,
        timing: TimingTable,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            tree,
            timing,
        }
    }

    /// Parse a scenario document. `source_name` is only used in errors and
    /// warnings. Returns the scenario plus any non-fatal load warnings.
    pub fn from_json(
        id: u32,
        source_name: &str,
        bytes: &[u8],
    ) -> ScenarioResult<(Self, Vec<String>)> {
        let file: ScenarioFile =
            serde_json::from_slice(bytes).map_err(|source| ScenarioError::Malformed {
                name: source_name.to_string(),
                source,
            })?;

        let mut warnings = Vec::new();
        let tree = ElementTree::from_defs(file.elements.unwrap_or_default(), &mut warnings);
        let timing = TimingTable::new(file.timing_points_map.unwrap_or_default());
        if !timing.is_sorted_by_reward() {
            warn!(scenario_id = id, "timing table is not sorted by descending points");
            warnings.push("timing table is not sorted by descending points".to_string());
        }

        Ok((Self::new(id, file.scenario_name, tree, timing), warnings))
    }

    /// Look up an element by id.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.tree.get(id)
    }
}
