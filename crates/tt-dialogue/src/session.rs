//! Dialogue session driver: feeds learner input through the state machine
//! and carries out the resulting effects.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use tt_core::{Category, Element, ElementId, Scenario, Trigger, Utterance};

use crate::config::DialogueConfig;
use crate::delivery::{DeliveryQueue, Pacer};
use crate::error::{DialogueError, DialogueResult};
use crate::machine::{BedStatusAsked, DialogueState, Effect, Event, Phase, TopicScope, transition};
use crate::matcher;
use crate::panels;
use crate::presenter::Presenter;

/// Upper bound on ticks spent by [`DialogueSession::drain`].
const MAX_DRAIN_TICKS: usize = 100_000;

/// What came of a learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input resolved to an element and its answer was queued.
    Matched {
        /// The element that was applied.
        element: ElementId,
        /// Triggers the caller must act on (ending the scenario, leaving
        /// the tutorial).
        engine_triggers: Vec<Trigger>,
    },
    /// Nothing matched; the fallback reply was queued.
    NoMatch,
}

impl Outcome {
    /// Whether the input resolved to an element.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Engine triggers of the matched element; empty on a miss.
    pub fn engine_triggers(&self) -> &[Trigger] {
        match self {
            Self::Matched {
                engine_triggers, ..
            } => engine_triggers,
            Self::NoMatch => &[],
        }
    }
}

/// One attempt at one scenario.
pub struct DialogueSession {
    scenario: Arc<Scenario>,
    config: DialogueConfig,
    state: DialogueState,
    queue: DeliveryQueue,
    pacer: Pacer,
    topic: Category,
}

impl DialogueSession {
    /// A not-yet-started attempt at `scenario`.
    pub fn new(scenario: Arc<Scenario>, config: DialogueConfig) -> Self {
        let state = DialogueState::new(&scenario);
        let pacer = Pacer::new(config.speaking_delay());
        Self {
            scenario,
            config,
            state,
            queue: DeliveryQueue::new(),
            pacer,
            topic: Category::TransferCenter,
        }
    }

    /// The scenario being played.
    pub fn scenario(&self) -> &Arc<Scenario> {
        &self.scenario
    }

    /// Settings for this attempt.
    pub fn config(&self) -> &DialogueConfig {
        &self.config
    }

    /// The committed state.
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether the call is connected.
    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    /// When bed status was asked.
    pub fn bed_status(&self) -> BedStatusAsked {
        self.state.bed_status
    }

    /// Current topic scope.
    pub fn scope(&self) -> TopicScope {
        self.state.scope()
    }

    /// The selected topic.
    pub fn topic(&self) -> &Category {
        &self.topic
    }

    /// Select the topic used by [`options`](Self::options).
    pub fn set_topic(&mut self, topic: Category) {
        debug!(%topic, "topic selected");
        self.topic = topic;
    }

    /// Seconds since the attempt started.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        self.state.elapsed_secs(now)
    }

    /// Visible elements in visible order.
    pub fn visible_elements(&self) -> Vec<&Element> {
        self.state
            .visible
            .iter()
            .filter_map(|id| self.scenario.element(id))
            .collect()
    }

    /// Start the attempt and queue the opening lines.
    pub fn start(&mut self, presenter: &mut dyn Presenter) -> DialogueResult<()> {
        self.start_at(Utc::now(), presenter)
    }

    /// [`start`](Self::start) at an explicit time.
    pub fn start_at(
        &mut self,
        at: DateTime<Utc>,
        presenter: &mut dyn Presenter,
    ) -> DialogueResult<()> {
        self.run(Event::Start { at }, presenter)?;
        info!(scenario_id = self.scenario.id, name = %self.scenario.name, "scenario started");
        Ok(())
    }

    /// Candidate elements for typed input under the selected topic.
    ///
    /// Topics outside the current scope yield nothing.
    pub fn options(&self, input: &str) -> Vec<ElementId> {
        self.options_for(&self.topic, input)
    }

    /// Candidate elements for typed input under an explicit topic.
    pub fn options_for(&self, topic: &Category, input: &str) -> Vec<ElementId> {
        if !self.state.is_active() || !self.scope().admits(topic) {
            return Vec::new();
        }
        matcher::resolve(
            &self.scenario.tree,
            topic,
            input,
            &self.state.visible,
            self.config.fuzzy_threshold,
        )
    }

    /// The learner says `text` verbatim. An exact match on a visible,
    /// in-scope element is applied; otherwise the fallback reply is queued.
    pub fn say(&mut self, text: &str, presenter: &mut dyn Presenter) -> DialogueResult<Outcome> {
        self.say_at(text, Utc::now(), presenter)
    }

    /// The visible, in-scope element whose learner text equals `text`, if
    /// any. This is the element [`say`](Self::say) would apply.
    pub fn exact_match(&self, text: &str) -> Option<ElementId> {
        if !self.state.is_active() {
            return None;
        }
        let scope = self.scope();
        matcher::find_exact(&self.scenario.tree, &self.state.visible, text, |c| {
            scope.admits(c)
        })
    }

    /// [`say`](Self::say) at an explicit time.
    pub fn say_at(
        &mut self,
        text: &str,
        at: DateTime<Utc>,
        presenter: &mut dyn Presenter,
    ) -> DialogueResult<Outcome> {
        if !self.state.is_active() {
            return Err(self.reject(DialogueError::NotActive));
        }
        match self.exact_match(text) {
            Some(id) => self.choose_at(id, at, presenter),
            None => {
                let recipient = self.addressee();
                let line = Utterance::new(self.config.learner_label.as_str(), recipient, text);
                self.queue.push_utterance(&line, &self.config.learner_label);
                debug!(input = text, "no element matched");
                self.run(Event::Miss, presenter)?;
                Ok(Outcome::NoMatch)
            }
        }
    }

    /// The learner picks an element (typically one returned by `options`).
    pub fn choose(
        &mut self,
        element: ElementId,
        presenter: &mut dyn Presenter,
    ) -> DialogueResult<Outcome> {
        self.choose_at(element, Utc::now(), presenter)
    }

    /// [`choose`](Self::choose) at an explicit time.
    pub fn choose_at(
        &mut self,
        element: ElementId,
        at: DateTime<Utc>,
        presenter: &mut dyn Presenter,
    ) -> DialogueResult<Outcome> {
        let result = transition(
            &self.state,
            &self.scenario,
            &self.config,
            Event::Apply { element, at },
        )
        .map_err(|e| self.reject(e))?;

        if let Some(line) = self
            .scenario
            .element(element)
            .and_then(|el| el.learner_response.clone())
        {
            let line = Utterance {
                speaker: self.config.learner_label.clone(),
                ..line
            };
            self.queue.push_utterance(&line, &self.config.learner_label);
        }
        debug!(%element, "element visited");

        self.state = result.new_state;
        let engine_triggers = self.execute(result.effects, presenter);
        Ok(Outcome::Matched {
            element,
            engine_triggers,
        })
    }

    /// End the attempt. Pending text is dropped without the completion cue.
    pub fn end(&mut self, presenter: &mut dyn Presenter) -> DialogueResult<()> {
        self.end_at(Utc::now(), presenter)
    }

    /// [`end`](Self::end) at an explicit time.
    pub fn end_at(
        &mut self,
        at: DateTime<Utc>,
        presenter: &mut dyn Presenter,
    ) -> DialogueResult<()> {
        self.run(Event::End { at }, presenter)?;
        info!(scenario_id = self.scenario.id, "scenario ended");
        Ok(())
    }

    /// Advance delivery by one step.
    pub fn tick(&mut self, presenter: &mut dyn Presenter) -> bool {
        let tick = self.queue.tick();
        for fragment in &tick.emitted {
            presenter.on_text_fragment(fragment);
        }
        if tick.completed {
            presenter.on_delivery_complete();
        }
        tick.completed
    }

    /// Feed elapsed frame time; steps delivery when the speaking delay has
    /// passed.
    pub fn update(&mut self, elapsed: Duration, presenter: &mut dyn Presenter) {
        if self.pacer.advance(elapsed) {
            self.tick(presenter);
        }
    }

    /// Tick until everything queued has been shown. Returns the number of
    /// ticks taken.
    pub fn drain(&mut self, presenter: &mut dyn Presenter) -> usize {
        let mut ticks = 0;
        while !self.queue.is_idle() && ticks < MAX_DRAIN_TICKS {
            self.tick(presenter);
            ticks += 1;
        }
        ticks
    }

    /// Whether text is still queued or the completion cue is due.
    pub fn has_pending_text(&self) -> bool {
        !self.queue.is_idle()
    }

    /// Vital-sign entries from visible `VitalSigns` elements.
    pub fn vital_signs(&self) -> Vec<(String, String)> {
        panels::panel_entries(&self.scenario, &self.state.visible, &Category::VitalSigns)
    }

    /// Lab entries from visible `LabResult` elements.
    pub fn lab_results(&self) -> Vec<(String, String)> {
        panels::panel_entries(&self.scenario, &self.state.visible, &Category::LabResult)
    }

    fn addressee(&self) -> &'static str {
        if self.state.connected {
            "OSH"
        } else {
            "TransferCenter"
        }
    }

    fn reject(&self, err: DialogueError) -> DialogueError {
        if err.is_state_violation() {
            error!(scenario_id = self.scenario.id, error = %err, "rejected dialogue input");
        }
        err
    }

    /// Run an event whose effects carry no engine triggers.
    fn run(&mut self, event: Event, presenter: &mut dyn Presenter) -> DialogueResult<()> {
        let result = transition(&self.state, &self.scenario, &self.config, event)
            .map_err(|e| self.reject(e))?;
        self.state = result.new_state;
        self.execute(result.effects, presenter);
        Ok(())
    }

    /// Carry out effects. Returns engine-handled triggers for the caller.
    fn execute(&mut self, effects: Vec<Effect>, presenter: &mut dyn Presenter) -> Vec<Trigger> {
        let mut engine_triggers = Vec::new();
        for effect in effects {
            match effect {
                Effect::Say(line) => self.queue.push_utterance(&line, &self.config.learner_label),
                Effect::VisibleSetChanged { revealed } => {
                    debug!(count = revealed.len(), "elements revealed");
                    presenter.on_visible_set_changed(&revealed);
                }
                Effect::Connected => info!(scenario_id = self.scenario.id, "connected to OSH"),
                Effect::BedStatusRecorded(status) => {
                    info!(scenario_id = self.scenario.id, ?status, "bed status question recorded");
                }
                Effect::Fire(trigger) if trigger.is_engine_handled() => {
                    debug!(%trigger, "engine trigger fired");
                    engine_triggers.push(trigger);
                }
                Effect::Fire(Trigger::Unknown(name)) => {
                    let err = DialogueError::UnknownTrigger(name);
                    warn!(scenario_id = self.scenario.id, error = %err, "trigger not dispatched");
                }
                Effect::Fire(trigger) => {
                    if let Err(err) = presenter.on_side_effect(&trigger) {
                        warn!(%trigger, error = %err, "side effect failed");
                    }
                }
                Effect::Ended => self.queue.cancel(),
            }
        }
        engine_triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::RecordingPresenter;
    use tt_core::tree::element;
    use tt_core::{ElementTree, TimingTable};

    fn scripted(category: Category, text: &str, answer: &str, keywords: &[&str]) -> Element {
        let mut el = element(
            category,
            Some(Utterance::new("Learner", "TransferCenter", text)),
            Some(Utterance::new("TransferCenter", "Learner", answer)),
        );
        el.matches = keywords.iter().map(|k| k.to_string()).collect();
        el
    }

    fn scenario() -> Arc<Scenario> {
        let mut tree = ElementTree::new();
        tree.add_root(element(
            Category::Opening,
            None,
            Some(Utterance::new("TransferCenter", "Learner", "Call on line one.")),
        ));
        let mut connect = scripted(
            Category::TransferCenter,
            "Connect me to the OSH",
            "Connecting.",
            &["connect", "osh"],
        );
        connect.triggers = vec![Trigger::Connect, Trigger::Unknown("Dance".into())];
        let connect = tree.add_root(connect);
        let mut age = scripted(
            Category::ElicitedHistory,
            "How old is the patient?",
            "Four.",
            &["age", "old"],
        );
        age.answer = Some(Utterance::new("OSH", "Learner", "Four."));
        let age = tree.add_child(connect, age).unwrap();
        let mut done = scripted(Category::Disposition, "Admit to PICU", "Okay.", &["admit"]);
        done.triggers = vec![Trigger::ShowPanel(tt_core::Panel::Vitals), Trigger::EndScenario];
        tree.add_child(age, done);
        tree.add_child(
            connect,
            element(
                Category::VitalSigns,
                None,
                Some(Utterance::new("Monitor", "Learner", r#"{"HR": 150, "BP": "80/40"}"#)),
            ),
        );
        Arc::new(Scenario::new(1, "Croup", tree, TimingTable::default()))
    }

    fn session() -> (DialogueSession, RecordingPresenter) {
        let mut presenter = RecordingPresenter::default();
        let mut session = DialogueSession::new(scenario(), DialogueConfig::default());
        session.start(&mut presenter).unwrap();
        (session, presenter)
    }

    #[test]
    fn opening_lines_are_delivered() {
        let (mut session, mut presenter) = session();
        session.drain(&mut presenter);
        assert!(presenter.text.contains("Call on line one."));
        assert_eq!(presenter.completions, 1);
    }

    #[test]
    fn input_before_start_is_rejected() {
        let mut presenter = RecordingPresenter::default();
        let mut session = DialogueSession::new(scenario(), DialogueConfig::default());
        assert!(matches!(
            session.say("hello", &mut presenter),
            Err(DialogueError::NotActive)
        ));
        assert!(!session.has_pending_text());
    }

    #[test]
    fn unmatched_input_gets_scoped_fallback() {
        let (mut session, mut presenter) = session();
        session.drain(&mut presenter);
        let outcome = session.say("How old is the patient?", &mut presenter).unwrap();
        assert_eq!(outcome, Outcome::NoMatch);
        session.drain(&mut presenter);
        assert!(presenter.text.contains("That's something you should ask the OSH"));
        assert_eq!(session.state().visits.visited_count(), 0);
    }

    #[test]
    fn connecting_changes_scope_and_reveals_children() {
        let (mut session, mut presenter) = session();
        let outcome = session.say("Connect me to the OSH", &mut presenter).unwrap();
        assert!(outcome.is_match());
        assert!(outcome.engine_triggers().is_empty());
        assert!(session.is_connected());
        assert_eq!(presenter.revealed.len(), 2);
        // The unknown trigger is reported, never handed to the presenter.
        assert!(presenter.side_effects.is_empty());

        session.set_topic(Category::ElicitedHistory);
        let options = session.options("old");
        assert_eq!(options.len(), 1);

        session.set_topic(Category::TransferCenter);
        assert!(session.options("connect").is_empty());

        session.say("Connect me to the OSH", &mut presenter).unwrap();
        session.drain(&mut presenter);
        assert!(presenter.text.contains("I'm not sure what you mean."));
    }

    #[test]
    fn exact_match_peeks_without_visiting() {
        let (mut session, mut presenter) = session();
        assert_eq!(session.exact_match("Connect me to the OSH"), Some(ElementId(1)));
        assert_eq!(session.exact_match("How old is the patient?"), None);
        assert_eq!(session.state().visits.visited_count(), 0);

        session.end(&mut presenter).unwrap();
        assert_eq!(session.exact_match("Connect me to the OSH"), None);
    }

    #[test]
    fn engine_triggers_are_returned() {
        let (mut session, mut presenter) = session();
        session.say("Connect me to the OSH", &mut presenter).unwrap();
        let age = session.options_for(&Category::ElicitedHistory, "age")[0];
        session.choose(age, &mut presenter).unwrap();
        let admit = session.options_for(&Category::Disposition, "admit")[0];
        let outcome = session.choose(admit, &mut presenter).unwrap();
        assert_eq!(outcome.engine_triggers(), &[Trigger::EndScenario]);
        assert_eq!(
            presenter.side_effects,
            vec![Trigger::ShowPanel(tt_core::Panel::Vitals)]
        );
    }

    #[test]
    fn rejected_choice_changes_nothing() {
        let (mut session, mut presenter) = session();
        session.drain(&mut presenter);
        let before = session.state().clone();
        let err = session.choose(ElementId(2), &mut presenter).unwrap_err();
        assert!(matches!(err, DialogueError::NotVisible(_)));
        assert_eq!(session.state(), &before);
        assert!(!session.has_pending_text());
    }

    #[test]
    fn learner_line_precedes_answer() {
        let (mut session, mut presenter) = session();
        session.drain(&mut presenter);
        presenter.text.clear();
        session.say("Connect me to the OSH", &mut presenter).unwrap();
        session.drain(&mut presenter);
        let asked = presenter.text.find("Connect me to the OSH").unwrap();
        let answered = presenter.text.find("Connecting.").unwrap();
        assert!(asked < answered);
    }

    #[test]
    fn ending_drops_pending_text() {
        let (mut session, mut presenter) = session();
        session.say("Connect me to the OSH", &mut presenter).unwrap();
        session.end(&mut presenter).unwrap();
        assert!(!session.has_pending_text());
        assert_eq!(session.drain(&mut presenter), 0);
        assert_eq!(presenter.completions, 0);
        assert_eq!(session.phase(), Phase::Ended);
    }

    #[test]
    fn panels_follow_visibility() {
        let (mut session, mut presenter) = session();
        assert!(session.vital_signs().is_empty());
        session.say("Connect me to the OSH", &mut presenter).unwrap();
        assert_eq!(
            session.vital_signs(),
            vec![
                ("HR".to_string(), "150".to_string()),
                ("BP".to_string(), "80/40".to_string()),
            ]
        );
        assert!(session.lab_results().is_empty());
    }

    #[test]
    fn update_paces_delivery() {
        let mut presenter = RecordingPresenter::default();
        let config = DialogueConfig::default().with_speaking_delay(0.5);
        let mut session = DialogueSession::new(scenario(), config);
        session.start(&mut presenter).unwrap();

        session.update(Duration::from_millis(200), &mut presenter);
        assert!(presenter.text.is_empty());
        session.update(Duration::from_millis(300), &mut presenter);
        assert!(!presenter.text.is_empty());
    }
}
