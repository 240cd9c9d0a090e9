use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::trigger::Trigger;

/// Stable index of an element inside its scenario's [`ElementTree`](crate::ElementTree).
///
/// Ids are assigned in depth-first pre-order when the tree is built, so the
/// root of a scenario is always `#0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub usize);

impl ElementId {
    /// Position in the tree's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One line of dialogue: who says what to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Who is talking (`Learner`, `TransferCenter`, `OSH`, ...).
    pub speaker: String,
    /// Who is being addressed.
    pub recipient: String,
    /// The spoken line.
    pub text: String,
}

impl Utterance {
    /// Build an utterance from its three parts.
    pub fn new(
        speaker: impl Into<String>,
        recipient: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            recipient: recipient.into(),
            text: text.into(),
        }
    }

    /// Build from a `[speaker, recipient, text]` list. Anything other than
    /// exactly three parts is rejected.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        match parts {
            [speaker, recipient, text] => Some(Self::new(
                speaker.as_str(),
                recipient.as_str(),
                text.as_str(),
            )),
            _ => None,
        }
    }

    /// The `[speaker, recipient, text]` list written to scenario files.
    pub fn to_parts(&self) -> Vec<String> {
        vec![
            self.speaker.clone(),
            self.recipient.clone(),
            self.text.clone(),
        ]
    }
}

/// A node of scripted scenario content.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// This element's id.
    pub id: ElementId,
    /// The enclosing element; `None` for roots.
    pub parent: Option<ElementId>,
    /// Topic the element belongs to.
    pub category: Category,
    /// What the learner says to reach this element. `None` if the source
    /// triple was absent or malformed.
    pub learner_response: Option<Utterance>,
    /// Keywords and phrases the resolver matches typed input against.
    pub matches: Vec<String>,
    /// The scripted reply. `None` if the source triple was absent or malformed.
    pub answer: Option<Utterance>,
    /// Points earned when visited, if the category is scored.
    pub score: i32,
    /// Side effects fired on each visit, in file order.
    pub triggers: Vec<Trigger>,
    /// Children revealed by a visit, in file order.
    pub children: Vec<ElementId>,
}

impl Element {
    /// Both triples are present, so the element can take part in matching.
    pub fn is_well_formed(&self) -> bool {
        self.learner_response.is_some() && self.answer.is_some()
    }

    /// Text of the learner's line, if any.
    pub fn learner_text(&self) -> Option<&str> {
        self.learner_response.as_ref().map(|u| u.text.as_str())
    }

    /// Text of the scripted reply, if any.
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_ref().map(|u| u.text.as_str())
    }

    /// Whether visiting this element fires `trigger`.
    pub fn has_trigger(&self, trigger: &Trigger) -> bool {
        self.triggers.contains(trigger)
    }
}

/// An element as written in a scenario file, children nested inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ElementDef {
    /// Category name.
    #[serde(default)]
    pub category: String,
    /// `[speaker, recipient, text]` of the learner's line.
    #[serde(default)]
    pub learner_response: Option<Vec<String>>,
    /// Keywords for the resolver.
    #[serde(default)]
    pub matches: Option<Vec<String>>,
    /// `[speaker, recipient, text]` of the reply.
    #[serde(default)]
    pub answer: Option<Vec<String>>,
    /// Score weight; missing means 0.
    #[serde(default)]
    pub score: i32,
    /// Accepted for compatibility with exported files; never read back.
    #[serde(default)]
    pub visited: Option<Vec<String>>,
    /// Trigger names.
    #[serde(default)]
    pub function: Option<Vec<String>>,
    /// Nested child elements.
    #[serde(default)]
    pub child: Option<Vec<ElementDef>>,
}
