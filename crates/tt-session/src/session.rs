//! A learner's training session: scenario attempts, scoring, and the record.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use tt_core::{Category, ElementId, ScenarioStore, Trigger};
use tt_dialogue::{DialogueSession, NullPresenter, Outcome, Presenter, RecordingPresenter};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::ledger::SessionLedger;
use crate::record::SessionRecord;
use crate::scoring::{ScoreSummary, ScoringInput, score};

/// A presenter that also shows final scores.
pub trait SessionPresenter: Presenter {
    /// A scenario was scored.
    fn on_score_finalized(&mut self, _summary: &ScoreSummary) {}
}

impl SessionPresenter for NullPresenter {}
impl SessionPresenter for RecordingPresenter {}

/// Where a session record ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRecord {
    /// The record as built.
    pub record: SessionRecord,
    /// File name the record was, or would be, saved under.
    pub file_name: String,
    /// Set when the record was written to the records directory.
    pub path: Option<PathBuf>,
}

/// One learner session across any number of scenario attempts.
pub struct TrainingSession {
    store: Arc<ScenarioStore>,
    config: SessionConfig,
    ledger: SessionLedger,
    active: Option<DialogueSession>,
    started_at: DateTime<Utc>,
}

impl TrainingSession {
    /// A session starting now.
    pub fn new(store: Arc<ScenarioStore>, config: SessionConfig) -> Self {
        Self::starting_at(store, config, Utc::now())
    }

    /// A session with an explicit start time.
    pub fn starting_at(
        store: Arc<ScenarioStore>,
        config: SessionConfig,
        at: DateTime<Utc>,
    ) -> Self {
        info!(
            learner = %config.learner_id,
            difficulty = %config.difficulty,
            "training session started"
        );
        Self {
            store,
            config,
            ledger: SessionLedger::new(),
            active: None,
            started_at: at,
        }
    }

    /// Session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Scored attempts so far.
    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// When the session started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The running attempt, if any.
    pub fn active(&self) -> Option<&DialogueSession> {
        self.active.as_ref()
    }

    /// The running attempt, mutably.
    pub fn active_mut(&mut self) -> Option<&mut DialogueSession> {
        self.active.as_mut()
    }

    fn require_active(&mut self) -> SessionResult<&mut DialogueSession> {
        self.active.as_mut().ok_or_else(|| {
            error!("no active scenario");
            SessionError::NoActiveScenario
        })
    }

    /// Start scenario `id`, replacing any running attempt without scoring it.
    pub fn start_scenario(
        &mut self,
        id: u32,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<()> {
        self.start_scenario_at(id, Utc::now(), presenter)
    }

    /// [`start_scenario`](Self::start_scenario) at an explicit time.
    pub fn start_scenario_at(
        &mut self,
        id: u32,
        at: DateTime<Utc>,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<()> {
        let scenario = self.store.get(id).inspect_err(|err| {
            error!(scenario_id = id, error = %err, "cannot start scenario");
        })?;
        if let Some(previous) = &self.active {
            warn!(scenario_id = previous.scenario().id, "abandoning unscored attempt");
        }
        let mut dialogue = DialogueSession::new(scenario, self.config.dialogue.clone());
        dialogue.start_at(at, presenter)?;
        self.active = Some(dialogue);
        Ok(())
    }

    /// Select the topic used by [`options`](Self::options).
    pub fn set_topic(&mut self, topic: Category) -> SessionResult<()> {
        self.require_active()?.set_topic(topic);
        Ok(())
    }

    /// Candidate elements for typed input under the selected topic.
    pub fn options(&self, input: &str) -> Vec<ElementId> {
        self.active
            .as_ref()
            .map(|dialogue| dialogue.options(input))
            .unwrap_or_default()
    }

    /// The learner says `text`. Engine triggers on the matched element are
    /// handled before returning.
    ///
    /// If the matched element finishes the tutorial and the follow-up
    /// scenario cannot be loaded, the input is rejected before anything is
    /// recorded and the tutorial stays active.
    pub fn say(
        &mut self,
        text: &str,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<Outcome> {
        self.say_at(text, Utc::now(), presenter)
    }

    /// [`say`](Self::say) at an explicit time.
    pub fn say_at(
        &mut self,
        text: &str,
        at: DateTime<Utc>,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<Outcome> {
        let target = self.require_active()?.exact_match(text);
        self.check_follow_up(target)?;
        let outcome = self.require_active()?.say_at(text, at, presenter)?;
        self.handle_engine_triggers(&outcome, at, presenter)?;
        Ok(outcome)
    }

    /// The learner picks an element. Same tutorial rule as [`say`](Self::say).
    pub fn choose(
        &mut self,
        element: ElementId,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<Outcome> {
        self.choose_at(element, Utc::now(), presenter)
    }

    /// [`choose`](Self::choose) at an explicit time.
    pub fn choose_at(
        &mut self,
        element: ElementId,
        at: DateTime<Utc>,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<Outcome> {
        self.check_follow_up(Some(element))?;
        let outcome = self.require_active()?.choose_at(element, at, presenter)?;
        self.handle_engine_triggers(&outcome, at, presenter)?;
        Ok(outcome)
    }

    /// Fails when `element` finishes the tutorial and the follow-up scenario
    /// is not available, so the visit is never committed.
    fn check_follow_up(&self, element: Option<ElementId>) -> SessionResult<()> {
        let Some(dialogue) = &self.active else {
            return Ok(());
        };
        let finishes_tutorial = element
            .and_then(|id| dialogue.scenario().element(id))
            .is_some_and(|el| el.has_trigger(&Trigger::FinishTutorial));
        if finishes_tutorial {
            let next = self.config.tutorial_next_scenario;
            self.store.get(next).inspect_err(|err| {
                error!(next_scenario = next, error = %err, "tutorial follow-up unavailable");
            })?;
        }
        Ok(())
    }

    fn handle_engine_triggers(
        &mut self,
        outcome: &Outcome,
        at: DateTime<Utc>,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<()> {
        for trigger in outcome.engine_triggers() {
            match trigger {
                Trigger::EndScenario => {
                    self.end_scenario_at(at, &mut *presenter)?;
                }
                Trigger::FinishTutorial => {
                    let next = self.config.tutorial_next_scenario;
                    info!(next_scenario = next, "tutorial finished");
                    self.start_scenario_at(next, at, &mut *presenter)?;
                }
                other => warn!(trigger = %other, "trigger not handled by the session"),
            }
        }
        Ok(())
    }

    /// Advance text delivery by one step.
    pub fn tick(&mut self, presenter: &mut impl SessionPresenter) -> bool {
        self.active
            .as_mut()
            .is_some_and(|dialogue| dialogue.tick(presenter))
    }

    /// Feed elapsed frame time to the running attempt.
    pub fn update(&mut self, elapsed: Duration, presenter: &mut impl SessionPresenter) {
        if let Some(dialogue) = self.active.as_mut() {
            dialogue.update(elapsed, presenter);
        }
    }

    /// Show everything queued at once.
    pub fn drain(&mut self, presenter: &mut impl SessionPresenter) -> usize {
        self.active
            .as_mut()
            .map_or(0, |dialogue| dialogue.drain(presenter))
    }

    /// End and score the running attempt.
    pub fn end_scenario(
        &mut self,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<ScoreSummary> {
        self.end_scenario_at(Utc::now(), presenter)
    }

    /// [`end_scenario`](Self::end_scenario) at an explicit time.
    pub fn end_scenario_at(
        &mut self,
        at: DateTime<Utc>,
        presenter: &mut impl SessionPresenter,
    ) -> SessionResult<ScoreSummary> {
        let dialogue = self.require_active()?;
        dialogue.end_at(at, presenter)?;

        let state = dialogue.state();
        let summary = score(ScoringInput {
            scenario: dialogue.scenario(),
            visible: &state.visible,
            visits: &state.visits,
            elapsed_secs: state.elapsed_secs(at),
            bed_status: state.bed_status,
        });
        self.active = None;

        info!(
            scenario = %summary.scenario_name,
            earned = summary.total_points,
            max = summary.total_max,
            elapsed = summary.time_elapsed_seconds,
            "scenario scored"
        );
        self.ledger.record(summary.clone());
        presenter.on_score_finalized(&summary);
        Ok(summary)
    }

    /// Abandon the running attempt, if any, and void the totals of every
    /// recorded attempt.
    pub fn exit_scenario(&mut self) {
        if let Some(dialogue) = self.active.take() {
            info!(scenario_id = dialogue.scenario().id, "attempt abandoned");
        }
        self.ledger.exit_scenario();
    }

    /// The session record as it stands.
    pub fn record(&self) -> SessionRecord {
        SessionRecord::from_ledger(
            &self.ledger,
            self.started_at,
            &self.config.learner_id,
            &self.config.difficulty,
        )
    }

    /// Build the session record and write it to the records directory, if
    /// one is configured.
    pub fn end_session(&self) -> SessionResult<SavedRecord> {
        self.end_session_at(Utc::now())
    }

    /// [`end_session`](Self::end_session) at an explicit time.
    pub fn end_session_at(&self, at: DateTime<Utc>) -> SessionResult<SavedRecord> {
        if let Some(dialogue) = &self.active {
            warn!(
                scenario_id = dialogue.scenario().id,
                "session ended with an unscored attempt"
            );
        }
        let record = self.record();
        let file_name = record.file_name(at);
        let path = match &self.config.records_dir {
            Some(dir) => Some(record.write_to(dir, at)?),
            None => None,
        };
        Ok(SavedRecord {
            record,
            file_name,
            path,
        })
    }
}
