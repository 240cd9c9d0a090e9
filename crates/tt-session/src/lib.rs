//! Training sessions for Transfer Tycoon.
//!
//! A [`TrainingSession`] runs scenario attempts one after another, scores
//! each finished attempt, and builds the [`SessionRecord`] written at the
//! end of the session.

pub mod config;
pub mod error;
pub mod ledger;
pub mod record;
pub mod scoring;
pub mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use ledger::SessionLedger;
pub use record::{SessionRecord, validate_learner_id};
pub use scoring::{ElementSnapshot, ScoreSummary, ScoringInput, Tally, format_timestamp, score};
pub use session::{SavedRecord, SessionPresenter, TrainingSession};
