//! Configuration for a training session.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tt_dialogue::DialogueConfig;

use crate::error::{SessionError, SessionResult};

/// Configuration for a training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Learner identifier written into the session record.
    pub learner_id: String,
    /// Free-form difficulty tag written into the session record.
    pub difficulty: String,
    /// Where session records are written. `None` keeps them in memory.
    pub records_dir: Option<PathBuf>,
    /// Scenario started when the tutorial finishes.
    pub tutorial_next_scenario: u32,
    /// Matching and delivery settings for every attempt.
    pub dialogue: DialogueConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            learner_id: "anonymous".to_string(),
            difficulty: "normal".to_string(),
            records_dir: None,
            tutorial_next_scenario: 2,
            dialogue: DialogueConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Read a TOML config file. Missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> SessionResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| SessionError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SessionError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the learner id.
    pub fn with_learner(mut self, learner_id: impl Into<String>) -> Self {
        self.learner_id = learner_id.into();
        self
    }

    /// Set the difficulty tag.
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    /// Write records into `dir`.
    pub fn with_records_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.records_dir = Some(dir.into());
        self
    }

    /// Set the scenario that follows the tutorial.
    pub fn with_tutorial_next(mut self, scenario_id: u32) -> Self {
        self.tutorial_next_scenario = scenario_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.tutorial_next_scenario, 2);
        assert!(cfg.records_dir.is_none());
        assert_eq!(cfg.dialogue, DialogueConfig::default());
    }

    #[test]
    fn builder_methods() {
        let cfg = SessionConfig::default()
            .with_learner("jd123")
            .with_difficulty("hard")
            .with_records_dir("/tmp/records")
            .with_tutorial_next(5);
        assert_eq!(cfg.learner_id, "jd123");
        assert_eq!(cfg.difficulty, "hard");
        assert_eq!(cfg.records_dir, Some(PathBuf::from("/tmp/records")));
        assert_eq!(cfg.tutorial_next_scenario, 5);
    }

    #[test]
    fn loads_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tt.toml");
        fs::write(
            &path,
            "learner_id = \"abc1\"\n\n[dialogue]\n\
             speaking_delay_secs = 0.0\nacceptance_phrase = \"Connect me\"\n",
        )
        .unwrap();
        let cfg = SessionConfig::from_toml_file(&path).unwrap();
        assert_eq!(cfg.learner_id, "abc1");
        assert_eq!(cfg.difficulty, "normal");
        assert_eq!(cfg.dialogue.speaking_delay_secs, 0.0);
        assert_eq!(cfg.dialogue.acceptance_phrase.as_deref(), Some("Connect me"));
        assert_eq!(cfg.dialogue.fuzzy_threshold, 0.4);
    }

    #[test]
    fn bad_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tt.toml");
        fs::write(&path, "learner_id = [").unwrap();
        assert!(matches!(
            SessionConfig::from_toml_file(&path),
            Err(SessionError::ConfigParse { .. })
        ));
        assert!(matches!(
            SessionConfig::from_toml_file(&dir.path().join("missing.toml")),
            Err(SessionError::ConfigIo { .. })
        ));
    }
}
