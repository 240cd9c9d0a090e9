//! Error types for training sessions.

use std::path::PathBuf;

use tt_core::ScenarioError;
use tt_dialogue::DialogueError;

/// Alias for `Result<T, SessionError>`.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by a training session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Scenario lookup failed.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// The dialogue engine rejected the input.
    #[error(transparent)]
    Dialogue(#[from] DialogueError),

    /// The learner id cannot be used in a record file name.
    #[error("invalid learner id \"{0}\": path separators and \"..\" are not allowed")]
    InvalidLearnerId(String),

    /// Scoring or input was requested with no scenario running.
    #[error("no scenario is active")]
    NoActiveScenario,

    /// The session record could not be written.
    #[error("cannot write session record {path}: {source}")]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The session record could not be serialized.
    #[error("cannot serialize session record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ConfigIo {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML for this schema.
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        /// Config path.
        path: PathBuf,
        /// TOML error.
        #[source]
        source: toml::de::Error,
    },
}
