use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::Scenario;

/// Name of the config document that sits next to the scenario files.
pub const CONFIG_FILE_NAME: &str = "ScenariosConfig.json";

/// Top-level description of a scenario collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenariosConfig {
    /// Human-readable collection description.
    pub description: String,
    /// Number of scenarios the collection claims to hold.
    pub scenario_count: u32,
    /// Scenario file names, used by sources without a directory listing.
    pub scenario_files: Vec<String>,
}

impl ScenariosConfig {
    /// Parse the config document.
    pub fn from_json(bytes: &[u8]) -> ScenarioResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| ScenarioError::Malformed {
            name: CONFIG_FILE_NAME.to_string(),
            source,
        })
    }
}

/// Extract the scenario id from a file name of the form `Scenario<digits>.json`.
/// Leading directories are ignored. Any other suffix, such as `.json.bak`,
/// is rejected.
pub fn scenario_id_from_file_name(name: &str) -> ScenarioResult<u32> {
    let bad = || ScenarioError::BadFileName(name.to_string());
    let file = Path::new(name)
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(bad)?;
    let rest = file.strip_prefix("Scenario").ok_or_else(bad)?;
    let digits = rest.strip_suffix(".json").ok_or_else(bad)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    digits.parse().map_err(|_| bad())
}

fn is_scenario_file_name(name: &str) -> bool {
    name != CONFIG_FILE_NAME && scenario_id_from_file_name(name).is_ok()
}

/// Where scenario documents come from.
pub trait ScenarioSource {
    /// Raw bytes of the config document, if the source has one.
    fn config(&self) -> ScenarioResult<Option<Vec<u8>>>;

    /// File names to load. `config` is the parsed config document, if any.
    fn file_names(&self, config: Option<&ScenariosConfig>) -> ScenarioResult<Vec<String>>;

    /// Raw bytes of one scenario document.
    fn fetch(&self, file_name: &str) -> ScenarioResult<Vec<u8>>;

    /// Human-readable label for log lines.
    fn describe(&self) -> String {
        "scenario source".to_string()
    }
}

/// Scenarios stored as files in a local directory.
///
/// Every file named `Scenario<digits>.json` is loaded; the config file is
/// optional and its file list is not consulted.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// A source reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The scenario directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: PathBuf) -> ScenarioResult<Vec<u8>> {
        fs::read(&path).map_err(|source| ScenarioError::Io { path, source })
    }
}

impl ScenarioSource for DirSource {
    fn config(&self) -> ScenarioResult<Option<Vec<u8>>> {
        let path = self.root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        self.read(path).map(Some)
    }

    fn file_names(&self, _config: Option<&ScenariosConfig>) -> ScenarioResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|source| ScenarioError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_scenario_file_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    fn fetch(&self, file_name: &str) -> ScenarioResult<Vec<u8>> {
        let path = self.root.join(file_name);
        if !path.exists() {
            return Err(ScenarioError::Missing(file_name.to_string()));
        }
        self.read(path)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Scenario documents already fetched as opaque byte blobs by an external
/// loader, keyed by file name.
///
/// The file list comes from the config document. Without a config every
/// blob with a scenario file name is loaded.
#[derive(Debug, Clone, Default)]
pub struct BlobSource {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl BlobSource {
    /// A source with no blobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_blob(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace one blob.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.insert(name.into(), bytes.into());
    }
}

impl ScenarioSource for BlobSource {
    fn config(&self) -> ScenarioResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(CONFIG_FILE_NAME).cloned())
    }

    fn file_names(&self, config: Option<&ScenariosConfig>) -> ScenarioResult<Vec<String>> {
        match config {
            Some(config) => Ok(config.scenario_files.clone()),
            None => Ok(self
                .blobs
                .keys()
                .filter(|name| is_scenario_file_name(name))
                .cloned()
                .collect()),
        }
    }

    fn fetch(&self, file_name: &str) -> ScenarioResult<Vec<u8>> {
        self.blobs
            .get(file_name)
            .cloned()
            .ok_or_else(|| ScenarioError::Missing(file_name.to_string()))
    }

    fn describe(&self) -> String {
        format!("{} fetched blobs", self.blobs.len())
    }
}

/// A file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// File name as the source listed it.
    pub file: String,
    /// Why it was skipped.
    pub reason: String,
}

/// A non-fatal problem found in a loaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// File name the warning belongs to.
    pub file: String,
    /// The warning text.
    pub message: String,
}

/// Outcome of loading a scenario collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Ids loaded, in load order.
    pub loaded: Vec<u32>,
    /// Files that could not be loaded.
    pub skipped: Vec<SkippedFile>,
    /// Non-fatal problems in loaded files.
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    /// Nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, file: &str, err: &ScenarioError) {
        warn!(file, error = %err, "skipping scenario file");
        self.skipped.push(SkippedFile {
            file: file.to_string(),
            reason: err.to_string(),
        });
    }

    fn warn_all(&mut self, file: &str, messages: Vec<String>) {
        self.warnings.extend(messages.into_iter().map(|message| LoadWarning {
            file: file.to_string(),
            message,
        }));
    }
}

/// Every loaded scenario, keyed by id.
///
/// Queries fail with [`ScenarioError::NotReady`] until [`mark_ready`] has been
/// called, so a non-blocking loader can ingest documents as they arrive.
///
/// [`mark_ready`]: ScenarioStore::mark_ready
#[derive(Debug, Default)]
pub struct ScenarioStore {
    scenarios: BTreeMap<u32, Arc<Scenario>>,
    config: Option<ScenariosConfig>,
    ready: bool,
}

impl ScenarioStore {
    /// An empty store that is not ready yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every scenario the source offers and mark the store ready.
    ///
    /// Individual bad files are skipped and listed in the report. When two
    /// files map to the same id, the first one listed wins and the later one
    /// is skipped. Only a failure to list the source at all is returned as an
    /// error.
    pub fn load(source: &dyn ScenarioSource) -> ScenarioResult<(Self, LoadReport)> {
        let mut store = Self::new();
        let mut report = LoadReport::default();

        match source.config() {
            Ok(Some(bytes)) => {
                if let Err(err) = store.ingest_config(&bytes) {
                    report.skip(CONFIG_FILE_NAME, &err);
                }
            }
            Ok(None) => debug!(source = %source.describe(), "no scenario config"),
            Err(err) => report.skip(CONFIG_FILE_NAME, &err),
        }

        let names = source.file_names(store.config.as_ref())?;
        for name in &names {
            let result = scenario_id_from_file_name(name)
                .and_then(|id| {
                    if report.loaded.contains(&id) {
                        Err(ScenarioError::DuplicateId {
                            id,
                            file: name.clone(),
                        })
                    } else {
                        source.fetch(name)
                    }
                })
                .and_then(|bytes| store.ingest_scenario(name, &bytes));
            match result {
                Ok((id, warnings)) => {
                    report.loaded.push(id);
                    report.warn_all(name, warnings);
                }
                Err(err) => report.skip(name, &err),
            }
        }

        let expected = store.config.as_ref().map(|c| c.scenario_count as usize);
        if let Some(expected) = expected.filter(|&n| n != report.loaded.len()) {
            warn!(
                expected,
                loaded = report.loaded.len(),
                "scenario count differs from config"
            );
        }

        store.mark_ready();
        info!(
            source = %source.describe(),
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "scenarios loaded"
        );
        Ok((store, report))
    }

    /// Parse and keep the config document.
    pub fn ingest_config(&mut self, bytes: &[u8]) -> ScenarioResult<()> {
        self.config = Some(ScenariosConfig::from_json(bytes)?);
        Ok(())
    }

    /// Parse one scenario document and store it under the id in its file
    /// name, replacing any earlier version. Returns the id and load warnings.
    pub fn ingest_scenario(
        &mut self,
        file_name: &str,
        bytes: &[u8],
    ) -> ScenarioResult<(u32, Vec<String>)> {
        let id = scenario_id_from_file_name(file_name)?;
        let (scenario, warnings) = Scenario::from_json(id, file_name, bytes)?;
        debug!(scenario_id = id, elements = scenario.tree.len(), "scenario ingested");
        self.scenarios.insert(id, Arc::new(scenario));
        Ok((id, warnings))
    }

    /// Flip the store to ready. Returns `true` only the first time.
    pub fn mark_ready(&mut self) -> bool {
        if self.ready {
            return false;
        }
        self.ready = true;
        true
    }

    /// Whether [`mark_ready`](Self::mark_ready) has been called.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Re-read one changed file: the config document or a single scenario.
    /// Other scenarios are left untouched. Returns the scenario id, or
    /// `None` when the config was reloaded.
    pub fn reload_file(&mut self, path: &Path) -> ScenarioResult<Option<u32>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ScenarioError::BadFileName(path.display().to_string()))?
            .to_string();
        let bytes = fs::read(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if name == CONFIG_FILE_NAME {
            self.ingest_config(&bytes)?;
            info!("scenario config reloaded");
            return Ok(None);
        }
        let (id, warnings) = self.ingest_scenario(&name, &bytes)?;
        for message in warnings {
            warn!(scenario_id = id, "{message}");
        }
        info!(scenario_id = id, "scenario reloaded");
        Ok(Some(id))
    }

    /// Forget the scenario stored under this file name.
    pub fn remove_file(&mut self, file_name: &str) -> ScenarioResult<Option<Arc<Scenario>>> {
        let id = scenario_id_from_file_name(file_name)?;
        let removed = self.scenarios.remove(&id);
        if removed.is_some() {
            info!(scenario_id = id, "scenario removed");
        }
        Ok(removed)
    }

    fn ensure_ready(&self) -> ScenarioResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(ScenarioError::NotReady)
        }
    }

    /// The scenario with this id.
    pub fn get(&self, id: u32) -> ScenarioResult<Arc<Scenario>> {
        self.ensure_ready()?;
        self.scenarios
            .get(&id)
            .cloned()
            .ok_or(ScenarioError::NotFound(id))
    }

    /// Loaded scenario ids in ascending order.
    pub fn ids(&self) -> ScenarioResult<Vec<u32>> {
        self.ensure_ready()?;
        Ok(self.scenarios.keys().copied().collect())
    }

    /// Every loaded scenario in id order.
    pub fn scenarios(&self) -> ScenarioResult<impl Iterator<Item = &Arc<Scenario>>> {
        self.ensure_ready()?;
        Ok(self.scenarios.values())
    }

    /// The config document, if one was loaded.
    pub fn config(&self) -> ScenarioResult<Option<&ScenariosConfig>> {
        self.ensure_ready()?;
        Ok(self.config.as_ref())
    }

    /// Number of stored scenarios, ready or not.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether no scenario is stored.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCENARIO: &str = r#"{
        "ScenarioName": "Bronchiolitis",
        "Elements": [
            { "Category": "TransferCenter",
              "LearnerResponse": ["Learner", "TransferCenter", "Hello"],
              "Matches": ["hello"],
              "Answer": ["TransferCenter", "Learner", "Hi"],
              "Score": 1 }
        ],
        "TimingPointsMap": [ { "timeSeconds": 30, "points": 10 } ]
    }"#;

    fn named(name: &str) -> String {
        SCENARIO.replace("Bronchiolitis", name)
    }

    #[test]
    fn file_name_parsing() {
        assert_eq!(scenario_id_from_file_name("Scenario12.json").unwrap(), 12);
        assert_eq!(scenario_id_from_file_name("dir/Scenario3.json").unwrap(), 3);
        assert!(scenario_id_from_file_name("Scenario.json").is_err());
        assert!(scenario_id_from_file_name("ScenarioA.json").is_err());
        assert!(scenario_id_from_file_name("Scenario4").is_err());
        assert!(scenario_id_from_file_name("Scenario4.json.bak").is_err());
        assert!(scenario_id_from_file_name("Scenario4.txt").is_err());
        assert!(scenario_id_from_file_name("Scenario4.bak.json").is_err());
        assert!(scenario_id_from_file_name("scenario4.json").is_err());
        assert!(scenario_id_from_file_name(CONFIG_FILE_NAME).is_err());
    }

    #[test]
    fn not_ready_until_marked() {
        let mut store = ScenarioStore::new();
        store
            .ingest_scenario("Scenario1.json", SCENARIO.as_bytes())
            .unwrap();
        assert!(matches!(store.get(1), Err(ScenarioError::NotReady)));
        assert!(matches!(store.ids(), Err(ScenarioError::NotReady)));

        assert!(store.mark_ready());
        assert!(!store.mark_ready(), "ready signal fires once");
        assert_eq!(store.get(1).unwrap().name, "Bronchiolitis");
        assert!(matches!(store.get(9), Err(ScenarioError::NotFound(9))));
    }

    #[test]
    fn dir_source_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scenario1.json"), named("One")).unwrap();
        fs::write(dir.path().join("Scenario2.json"), "{ broken").unwrap();
        fs::write(dir.path().join("Scenario3.json"), named("Three")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"description":"Test set","scenarioCount":3,"scenarioFiles":["Scenario1.json"]}"#,
        )
        .unwrap();

        let (store, report) = ScenarioStore::load(&DirSource::new(dir.path())).unwrap();
        assert_eq!(store.ids().unwrap(), vec![1, 3]);
        assert_eq!(report.loaded, vec![1, 3]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file, "Scenario2.json");
        assert!(!report.is_complete());
        assert_eq!(store.config().unwrap().unwrap().description, "Test set");
    }

    #[test]
    fn backup_copies_do_not_replace_the_real_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scenario1.json"), named("Real")).unwrap();
        fs::write(dir.path().join("Scenario1.json.bak"), named("Stale")).unwrap();
        fs::write(dir.path().join("Scenario1.json~"), named("Editor")).unwrap();

        let (store, report) = ScenarioStore::load(&DirSource::new(dir.path())).unwrap();
        assert_eq!(report.loaded, vec![1]);
        assert!(report.is_complete());
        assert_eq!(store.get(1).unwrap().name, "Real");
    }

    #[test]
    fn duplicate_ids_keep_the_first_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scenario01.json"), named("Padded")).unwrap();
        fs::write(dir.path().join("Scenario1.json"), named("Plain")).unwrap();

        let (store, report) = ScenarioStore::load(&DirSource::new(dir.path())).unwrap();
        assert_eq!(report.loaded, vec![1]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].file, "Scenario1.json");
        assert!(report.skipped[0].reason.contains("duplicate scenario id 1"));
        assert_eq!(store.get(1).unwrap().name, "Padded");
    }

    #[test]
    fn dir_source_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let missing = DirSource::new(dir.path().join("nope"));
        assert!(matches!(
            ScenarioStore::load(&missing),
            Err(ScenarioError::Io { .. })
        ));
    }

    #[test]
    fn blob_source_follows_config_list() {
        let source = BlobSource::new()
            .with_blob(
                CONFIG_FILE_NAME,
                r#"{"description": "Web", "scenarioCount": 2,
                    "scenarioFiles": ["Scenario1.json", "Scenario5.json"]}"#,
            )
            .with_blob("Scenario1.json", named("One"))
            .with_blob("Scenario2.json", named("Unlisted"));

        let (store, report) = ScenarioStore::load(&source).unwrap();
        assert_eq!(store.ids().unwrap(), vec![1]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Scenario5.json"));
    }

    #[test]
    fn blob_source_without_config_loads_everything() {
        let source = BlobSource::new()
            .with_blob("Scenario1.json", named("One"))
            .with_blob("Scenario2.json", named("Two"));
        let (store, report) = ScenarioStore::load(&source).unwrap();
        assert_eq!(store.ids().unwrap(), vec![1, 2]);
        assert!(report.is_complete());
        assert!(store.config().unwrap().is_none());
    }

    #[test]
    fn reload_replaces_one_scenario_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scenario1.json"), named("One")).unwrap();
        fs::write(dir.path().join("Scenario2.json"), named("Two")).unwrap();
        let (mut store, _) = ScenarioStore::load(&DirSource::new(dir.path())).unwrap();
        let two_before = store.get(2).unwrap();

        let path = dir.path().join("Scenario1.json");
        fs::write(&path, named("One, revised")).unwrap();
        assert_eq!(store.reload_file(&path).unwrap(), Some(1));

        assert_eq!(store.get(1).unwrap().name, "One, revised");
        assert!(Arc::ptr_eq(&two_before, &store.get(2).unwrap()));
    }

    #[test]
    fn reload_config_and_remove() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Scenario1.json"), named("One")).unwrap();
        let (mut store, _) = ScenarioStore::load(&DirSource::new(dir.path())).unwrap();

        let config = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config, r#"{"description":"Late"}"#).unwrap();
        assert_eq!(store.reload_file(&config).unwrap(), None);
        assert_eq!(store.config().unwrap().unwrap().description, "Late");

        assert!(store.remove_file("Scenario1.json").unwrap().is_some());
        assert!(store.remove_file("Scenario1.json").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn load_warnings_are_reported() {
        let doc = r#"{
            "ScenarioName": "Warned",
            "Elements": [
                { "Category": "TransferCenter", "Answer": ["only", "two"], "Function": ["Dance"] }
            ],
            "TimingPointsMap": [
                { "timeSeconds": 60, "points": 1 },
                { "timeSeconds": 30, "points": 9 }
            ]
        }"#;
        let source = BlobSource::new().with_blob("Scenario7.json", doc);
        let (_, report) = ScenarioStore::load(&source).unwrap();
        assert_eq!(report.loaded, vec![7]);
        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings.iter().all(|w| w.file == "Scenario7.json"));
    }
}
