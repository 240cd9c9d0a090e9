//! Dialogue state for one scenario attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::{Category, Scenario, VisibleSet, VisitLog};

/// Where the attempt is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Created but not started.
    #[default]
    NotStarted,
    /// Accepting input.
    Active,
    /// Over; input is rejected.
    Ended,
}

/// When the learner asked about bed status, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BedStatusAsked {
    /// Never asked.
    #[default]
    NotAsked,
    /// Asked once the call was connected.
    AskedAfterConnected,
    /// Asked of the transfer center before connecting.
    AskedBeforeConnected,
}

impl BedStatusAsked {
    /// The value to record for a question asked in the given connection state.
    pub fn for_connection(connected: bool) -> Self {
        if connected {
            Self::AskedAfterConnected
        } else {
            Self::AskedBeforeConnected
        }
    }
}

/// Which categories are eligible for matching.
///
/// Before the call is connected only the transfer center can be addressed;
/// afterwards everything except the transfer center is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicScope {
    /// Not connected yet.
    TransferCenterOnly,
    /// Connected.
    ExcludingTransferCenter,
}

impl TopicScope {
    /// The scope for the given connection state.
    pub fn for_connection(connected: bool) -> Self {
        if connected {
            Self::ExcludingTransferCenter
        } else {
            Self::TransferCenterOnly
        }
    }

    /// Whether elements of `category` may be matched or applied.
    pub fn admits(self, category: &Category) -> bool {
        match self {
            Self::TransferCenterOnly => category.is_transfer_center(),
            Self::ExcludingTransferCenter => !category.is_transfer_center(),
        }
    }
}

/// Everything that changes while a scenario is played.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DialogueState {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Whether the call to the referring hospital is connected.
    pub connected: bool,
    /// When bed status was first asked.
    pub bed_status: BedStatusAsked,
    /// Elements eligible for matching.
    pub visible: VisibleSet,
    /// Visit timestamps per element.
    pub visits: VisitLog,
    /// Set by `Start`.
    pub started_at: Option<DateTime<Utc>>,
}

impl DialogueState {
    /// Fresh state for a scenario: not started, roots visible, nothing visited.
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            visible: VisibleSet::from_roots(&scenario.tree),
            ..Self::default()
        }
    }

    /// The current topic scope.
    pub fn scope(&self) -> TopicScope {
        TopicScope::for_connection(self.connected)
    }

    /// Whether input is accepted.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Seconds since the attempt started, or 0 if it never did.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        self.started_at.map_or(0.0, |start| {
            (now - start).num_milliseconds().max(0) as f64 / 1000.0
        })
    }
}
