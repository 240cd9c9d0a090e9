//! Inputs to the dialogue state machine.

use chrono::{DateTime, Utc};
use tt_core::ElementId;

/// Something that happened to the attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The learner entered the scenario.
    Start {
        /// Start time; elapsed time is measured from here.
        at: DateTime<Utc>,
    },
    /// The learner's input resolved to this element.
    Apply {
        /// The resolved element.
        element: ElementId,
        /// Visit time.
        at: DateTime<Utc>,
    },
    /// The learner's input matched nothing.
    Miss,
    /// The attempt is over.
    End {
        /// End time.
        at: DateTime<Utc>,
    },
}
