//! Dialogue state machine: explicit state, pure transitions, and effects.

mod effect;
mod event;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{BedStatusAsked, DialogueState, Phase, TopicScope};
pub use transition::{TransitionResult, transition};
