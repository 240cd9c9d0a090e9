//! Dialogue engine for Transfer Tycoon.
//!
//! Learner input is matched against the visible elements of a scenario,
//! gated by whether the call to the referring hospital is connected, and
//! answered through a paced delivery queue. State changes go through a pure
//! [`transition`](machine::transition) function; [`DialogueSession`] drives it
//! and hands output to a [`Presenter`].

/// Dialogue settings.
pub mod config;
/// Paced delivery of dialogue text.
pub mod delivery;
/// Error types.
pub mod error;
/// State, events, effects, and the transition function.
pub mod machine;
/// Keyword and fuzzy matching of learner input.
pub mod matcher;
/// Vital-sign and lab panels.
pub mod panels;
/// The presentation boundary.
pub mod presenter;
/// The session driver.
pub mod session;

pub use config::DialogueConfig;
pub use delivery::{DeliveryQueue, Fragment, FragmentKind, FragmentMode, Pacer, Tick};
pub use error::{DialogueError, DialogueResult};
pub use machine::{BedStatusAsked, DialogueState, Effect, Event, Phase, TopicScope};
pub use presenter::{NullPresenter, Presenter, RecordingPresenter};
pub use session::{DialogueSession, Outcome};
