//! Core types for Transfer Tycoon: scenario elements, element trees, and the
//! scenario store.
//!
//! A scenario is a tree of scripted [`Element`]s (learner question, scripted
//! answer, score weight) plus a timing table. This crate owns the content
//! model and its loading; dialogue and scoring live in the crates above it.

/// Element categories (dialogue topics) and their scoring buckets.
pub mod category;
/// Scripted elements, identifiers, and speaker/recipient/text triples.
pub mod element;
/// Error types used throughout the crate.
pub mod error;
/// Scenarios and their timing tables.
pub mod scenario;
/// Loading scenarios from directories or fetched blobs.
pub mod store;
/// The element arena and depth-first flattening.
pub mod tree;
/// Side-effect triggers attached to elements.
pub mod trigger;
/// Per-attempt visibility and visit tracking.
pub mod visibility;

pub use category::{Category, ScoreBucket};
pub use element::{Element, ElementDef, ElementId, Utterance};
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::{Scenario, ScenarioFile, TimingPoint, TimingTable};
pub use store::{
    BlobSource, CONFIG_FILE_NAME, DirSource, LoadReport, LoadWarning, ScenarioSource,
    ScenarioStore, ScenariosConfig, SkippedFile, scenario_id_from_file_name,
};
pub use tree::ElementTree;
pub use trigger::{Panel, Trigger};
pub use visibility::{VisibleSet, VisitLog};
