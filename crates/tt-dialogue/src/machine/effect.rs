//! Side effects produced by state transitions.

use tt_core::{ElementId, Trigger, Utterance};

use super::state::BedStatusAsked;

/// Effects to be executed by the session driver after a transition is
/// committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Queue a line of dialogue for delivery.
    Say(Utterance),
    /// Elements that became visible.
    VisibleSetChanged {
        /// Newly revealed ids, in reveal order.
        revealed: Vec<ElementId>,
    },
    /// The call to the referring hospital is now connected.
    Connected,
    /// The bed-status question was asked for the first time.
    BedStatusRecorded(BedStatusAsked),
    /// Fire a trigger attached to the applied element.
    Fire(Trigger),
    /// The attempt ended; pending delivery is dropped.
    Ended,
}
