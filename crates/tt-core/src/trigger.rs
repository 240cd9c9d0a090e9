use std::fmt;

use serde::{Deserialize, Serialize};

/// Patient-info panels the presentation layer can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Panel {
    /// Vital signs.
    Vitals,
    /// Lab results.
    Labs,
    /// Imaging studies.
    Imaging,
}

/// A named side effect attached to an element, fired when the element is
/// visited.
///
/// Scenario files name triggers as plain strings. Names are resolved against
/// this closed set at load time; anything else becomes `Unknown` and is
/// reported rather than dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Trigger {
    /// The referring hospital is now on the line.
    Connect,
    /// End and score the running scenario.
    EndScenario,
    /// Leave the tutorial and start the first real scenario.
    FinishTutorial,
    /// Show or hide the patient info area.
    TogglePatientInfo,
    /// Switch the patient info area to a panel (`SwitchToVitals` and friends).
    ShowPanel(Panel),
    /// Turn the workstation screen on or off.
    TogglePower,
    /// A name outside the known set.
    Unknown(String),
}

impl Trigger {
    /// Resolve a trigger name from a scenario file.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "Connect" => Self::Connect,
            "EndScenario" => Self::EndScenario,
            "FinishTutorial" => Self::FinishTutorial,
            "TogglePatientInfo" => Self::TogglePatientInfo,
            "SwitchToVitals" => Self::ShowPanel(Panel::Vitals),
            "SwitchToLabs" => Self::ShowPanel(Panel::Labs),
            "SwitchToImaging" => Self::ShowPanel(Panel::Imaging),
            "TogglePower" => Self::TogglePower,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The name as written in scenario files.
    pub fn name(&self) -> &str {
        match self {
            Self::Connect => "Connect",
            Self::EndScenario => "EndScenario",
            Self::FinishTutorial => "FinishTutorial",
            Self::TogglePatientInfo => "TogglePatientInfo",
            Self::ShowPanel(Panel::Vitals) => "SwitchToVitals",
            Self::ShowPanel(Panel::Labs) => "SwitchToLabs",
            Self::ShowPanel(Panel::Imaging) => "SwitchToImaging",
            Self::TogglePower => "TogglePower",
            Self::Unknown(name) => name,
        }
    }

    /// Triggers acted on by the engine itself rather than the presentation layer.
    pub fn is_engine_handled(&self) -> bool {
        matches!(self, Self::Connect | Self::EndScenario | Self::FinishTutorial)
    }

    /// False for names outside the known set.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for Trigger {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Trigger> for String {
    fn from(t: Trigger) -> Self {
        t.name().to_string()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
