use std::path::PathBuf;

/// Alias for `Result<T, ScenarioError>`.
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors raised while loading or querying scenarios.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A scenario or config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The content is not a valid scenario or config document.
    #[error("malformed {name}: {source}")]
    Malformed {
        /// File name of the document.
        name: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The file name does not follow `Scenario<digits>.json`.
    #[error("not a scenario file name: \"{0}\"")]
    BadFileName(String),

    /// A file listed by the source could not be fetched.
    #[error("missing scenario file: \"{0}\"")]
    Missing(String),

    /// Two files in one load resolve to the same scenario id.
    #[error("duplicate scenario id {id}: \"{file}\" is ignored")]
    DuplicateId {
        /// The contested id.
        id: u32,
        /// The file that lost.
        file: String,
    },

    /// Scenario data was queried before loading finished.
    #[error("scenarios are not loaded yet")]
    NotReady,

    /// No scenario with this id has been loaded.
    #[error("scenario {0} not found")]
    NotFound(u32),
}
