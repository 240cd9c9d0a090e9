use tt_core::{Category, ElementId};

/// Alias for `Result<T, DialogueError>`.
pub type DialogueResult<T> = Result<T, DialogueError>;

/// Errors raised while driving a dialogue.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    /// The element exists but has not been revealed yet.
    #[error("element {0} is not visible")]
    NotVisible(ElementId),

    /// The element's topic is not eligible in the current connection state.
    #[error("element {element} ({category}) is outside the current topic scope")]
    OutOfScope {
        /// The rejected element.
        element: ElementId,
        /// Its topic.
        category: Category,
    },

    /// Input arrived while no scenario was running.
    #[error("no scenario is running")]
    NotActive,

    /// The scenario was already started.
    #[error("scenario already started")]
    AlreadyStarted,

    /// No element with this id exists in the scenario.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    /// A trigger name outside the known set was fired.
    #[error("unknown trigger \"{0}\"")]
    UnknownTrigger(String),

    /// The presentation layer could not carry out a side effect.
    #[error("presentation error: {0}")]
    Presentation(String),
}

impl DialogueError {
    /// Invalid-state errors: the input was rejected and nothing changed.
    pub fn is_state_violation(&self) -> bool {
        matches!(
            self,
            Self::NotVisible(_)
                | Self::OutOfScope { .. }
                | Self::NotActive
                | Self::AlreadyStarted
                | Self::UnknownElement(_)
        )
    }
}
