//! Pure state transition function.

use tt_core::{Category, Element, Scenario, Trigger};

use super::{BedStatusAsked, DialogueState, Effect, Event, Phase};
use crate::config::DialogueConfig;
use crate::error::{DialogueError, DialogueResult};

/// Result of a state transition.
#[derive(Debug)]
pub struct TransitionResult {
    /// State to commit.
    pub new_state: DialogueState,
    /// Effects to run after committing, in order.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    /// A result with no effects.
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// Append one effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Append several effects.
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Compute the next state for `event`.
///
/// Given the same inputs this always produces the same outputs. Rejected
/// events return an error and the caller keeps its current state.
pub fn transition(
    state: &DialogueState,
    scenario: &Scenario,
    config: &DialogueConfig,
    event: Event,
) -> DialogueResult<TransitionResult> {
    match (state.phase, event) {
        (Phase::NotStarted, Event::Start { at }) => {
            let mut next = state.clone();
            next.phase = Phase::Active;
            next.started_at = Some(at);
            let opening = opening_lines(&next, scenario);
            Ok(TransitionResult::new(next).with_effects(opening))
        }
        (_, Event::Start { .. }) => Err(DialogueError::AlreadyStarted),

        (Phase::Active, Event::Apply { element, at }) => {
            let el = scenario
                .element(element)
                .ok_or(DialogueError::UnknownElement(element))?;
            if !state.visible.contains(element) {
                return Err(DialogueError::NotVisible(element));
            }
            if !state.scope().admits(&el.category) {
                return Err(DialogueError::OutOfScope {
                    element,
                    category: el.category.clone(),
                });
            }
            Ok(apply(state, scenario, config, el, at))
        }

        (Phase::Active, Event::Miss) => {
            let line = config.fallback(state.connected).clone();
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::Say(line)))
        }

        (Phase::Active, Event::End { .. }) => {
            let mut next = state.clone();
            next.phase = Phase::Ended;
            Ok(TransitionResult::new(next).with_effect(Effect::Ended))
        }

        (
            Phase::NotStarted | Phase::Ended,
            Event::Apply { .. } | Event::Miss | Event::End { .. },
        ) => Err(DialogueError::NotActive),
    }
}

fn opening_lines(state: &DialogueState, scenario: &Scenario) -> Vec<Effect> {
    state
        .visible
        .iter()
        .filter_map(|id| scenario.element(id))
        .filter(|el| el.category == Category::Opening)
        .filter_map(|el| el.answer.clone())
        .map(Effect::Say)
        .collect()
}

fn apply(
    state: &DialogueState,
    scenario: &Scenario,
    config: &DialogueConfig,
    el: &Element,
    at: chrono::DateTime<chrono::Utc>,
) -> TransitionResult {
    let mut next = state.clone();
    let mut effects = Vec::new();

    if let Some(answer) = &el.answer {
        effects.push(Effect::Say(answer.clone()));
    }

    next.visits.record(el.id, at);
    let revealed = next.visible.reveal(&scenario.tree, el.id);
    if !revealed.is_empty() {
        effects.push(Effect::VisibleSetChanged { revealed });
    }

    let is_transfer_center = el.category.is_transfer_center();
    if is_transfer_center
        && el.learner_text() == Some(config.bed_status_phrase.as_str())
        && next.bed_status == BedStatusAsked::NotAsked
    {
        next.bed_status = BedStatusAsked::for_connection(state.connected);
        effects.push(Effect::BedStatusRecorded(next.bed_status));
    }

    let accepted = is_transfer_center
        && config
            .acceptance_phrase
            .as_deref()
            .is_some_and(|phrase| el.learner_text() == Some(phrase));
    if (accepted || el.has_trigger(&Trigger::Connect)) && !next.connected {
        next.connected = true;
        effects.push(Effect::Connected);
    }

    effects.extend(
        el.triggers
            .iter()
            .filter(|trigger| **trigger != Trigger::Connect)
            .cloned()
            .map(Effect::Fire),
    );

    TransitionResult::new(next).with_effects(effects)
}
