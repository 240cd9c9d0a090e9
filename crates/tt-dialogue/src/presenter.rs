//! The boundary between the dialogue engine and whatever displays it.

use tt_core::{ElementId, Trigger};

use crate::delivery::Fragment;
use crate::error::{DialogueError, DialogueResult};

/// Receives everything the engine wants shown.
///
/// All methods have no-op defaults so a front end only implements what it
/// displays.
pub trait Presenter {
    /// A piece of dialogue text is ready to be shown.
    fn on_text_fragment(&mut self, _fragment: &Fragment) {}

    /// The delivery queue ran dry; play the attention cue.
    fn on_delivery_complete(&mut self) {}

    /// New elements became eligible for matching.
    fn on_visible_set_changed(&mut self, _revealed: &[ElementId]) {}

    /// A presentation trigger fired (panel switches, power toggles).
    ///
    /// Unknown names are rejected by default.
    fn on_side_effect(&mut self, trigger: &Trigger) -> DialogueResult<()> {
        match trigger {
            Trigger::Unknown(name) => Err(DialogueError::UnknownTrigger(name.clone())),
            _ => Ok(()),
        }
    }
}

/// A presenter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// A presenter that records what it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    /// All fragment text, concatenated.
    pub text: String,
    /// Completion cues seen.
    pub completions: usize,
    /// Revealed ids in order.
    pub revealed: Vec<ElementId>,
    /// Presentation triggers in firing order.
    pub side_effects: Vec<Trigger>,
}

impl Presenter for RecordingPresenter {
    fn on_text_fragment(&mut self, fragment: &Fragment) {
        self.text.push_str(&fragment.text);
    }

    fn on_delivery_complete(&mut self) {
        self.completions += 1;
    }

    fn on_visible_set_changed(&mut self, revealed: &[ElementId]) {
        self.revealed.extend_from_slice(revealed);
    }

    fn on_side_effect(&mut self, trigger: &Trigger) -> DialogueResult<()> {
        self.side_effects.push(trigger.clone());
        match trigger {
            Trigger::Unknown(name) => Err(DialogueError::UnknownTrigger(name.clone())),
            _ => Ok(()),
        }
    }
}
