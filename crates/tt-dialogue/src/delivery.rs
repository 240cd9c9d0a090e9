//! Paced text delivery.
//!
//! Dialogue lines are broken into fragments and queued. Each tick the
//! queue emits all leading instant fragments whole and then at most one
//! character of an incremental fragment. When the queue runs dry the
//! completion cue fires once.

use std::collections::VecDeque;
use std::time::Duration;

use tt_core::Utterance;

/// How a fragment is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentMode {
    /// Emitted whole in a single tick.
    Instant,
    /// Emitted one character per tick.
    Incremental,
}

/// What part of a line a fragment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Blank space separating lines.
    Spacer,
    /// The speaker's name.
    Label,
    /// Break between label and text.
    LineBreak,
    /// The spoken text.
    Text,
    /// Trailing pause after a non-learner line.
    Pause,
}

/// A piece of text waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Role within the line.
    pub kind: FragmentKind,
    /// Instant or typed out.
    pub mode: FragmentMode,
    /// Text still to show.
    pub text: String,
    /// Part of a learner line (front ends usually align these differently).
    pub from_learner: bool,
}

impl Fragment {
    fn new(
        kind: FragmentKind,
        mode: FragmentMode,
        text: impl Into<String>,
        from_learner: bool,
    ) -> Self {
        Self {
            kind,
            mode,
            text: text.into(),
            from_learner,
        }
    }
}

const SPACER: &str = "\n\n";
const PAUSE: &str = "     ";

/// Output of one queue step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    /// Fragments shown this step. Incremental output arrives as
    /// single-character fragments.
    pub emitted: Vec<Fragment>,
    /// The queue just ran dry; fire the attention cue.
    pub completed: bool,
}

/// FIFO of fragments with a one-shot completion flag.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    pending: VecDeque<Fragment>,
    finished: bool,
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            finished: true,
        }
    }
}

impl DeliveryQueue {
    /// An empty, idle queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one fragment.
    pub fn push(&mut self, fragment: Fragment) {
        self.finished = false;
        self.pending.push_back(fragment);
    }

    /// Queue a full line. Learner lines show their text at once; everyone
    /// else's text is typed out.
    pub fn push_utterance(&mut self, line: &Utterance, learner_label: &str) {
        use FragmentKind::*;
        use FragmentMode::*;

        self.finished = false;
        if line.speaker == learner_label {
            self.push(Fragment::new(Spacer, Instant, SPACER, true));
            self.push(Fragment::new(Label, Instant, line.speaker.as_str(), true));
            self.push(Fragment::new(LineBreak, Incremental, "\n", true));
            self.push(Fragment::new(Text, Instant, line.text.as_str(), true));
        } else {
            self.push(Fragment::new(Spacer, Instant, SPACER, false));
            if !line.speaker.is_empty() {
                self.push(Fragment::new(Label, Instant, line.speaker.as_str(), false));
                self.push(Fragment::new(LineBreak, Incremental, "\n", false));
            }
            self.push(Fragment::new(Text, Incremental, line.text.as_str(), false));
            self.push(Fragment::new(Pause, Incremental, PAUSE, false));
        }
    }

    /// Advance delivery by one step.
    pub fn tick(&mut self) -> Tick {
        let mut tick = Tick::default();
        loop {
            while self.pending.front().is_some_and(|f| f.text.is_empty()) {
                self.pending.pop_front();
            }

            let Some(front) = self.pending.front_mut() else {
                if !self.finished {
                    self.finished = true;
                    tick.completed = true;
                }
                return tick;
            };
            self.finished = false;

            match front.mode {
                FragmentMode::Instant => {
                    if let Some(fragment) = self.pending.pop_front() {
                        tick.emitted.push(fragment);
                    }
                }
                FragmentMode::Incremental => {
                    let mut chars = front.text.chars();
                    if let Some(first) = chars.next() {
                        let rest = chars.as_str().to_string();
                        tick.emitted.push(Fragment {
                            text: first.to_string(),
                            ..front.clone()
                        });
                        front.text = rest;
                    }
                    return tick;
                }
            }
        }
    }

    /// Drop everything pending without firing the completion cue.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.finished = true;
    }

    /// Nothing pending and the completion cue already fired.
    pub fn is_idle(&self) -> bool {
        self.finished && self.pending.is_empty()
    }

    /// Number of pending fragments.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no fragment is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Turns elapsed frame time into queue steps at a fixed delay.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    accumulated: Duration,
}

impl Pacer {
    /// A pacer stepping once per `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            accumulated: Duration::ZERO,
        }
    }

    /// Add elapsed time. Returns `true` when a step is due; at most one step
    /// is taken per call and any surplus carries over.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;
        if self.accumulated >= self.delay {
            self.accumulated -= self.delay;
            true
        } else {
            false
        }
    }

    /// The configured step delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}
