use crate::{Forest, TreeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the data directory when set.
pub const HOME_ENV: &str = "RDT_CONFIG_HOME";

const FOREST_SUFFIX: &str = ".forest.json";

/// Resolve the data directory: `$RDT_CONFIG_HOME`, else `~/.rdt-config/`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rdt-config")
}

/// Forest names become file names, so keep them to `[A-Za-z0-9_-]`.
pub fn check_forest_name(name: &str) -> Result<(), TreeError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TreeError::ValidationFailed(format!(
            "forest name '{}' must be non-empty and use only letters, digits, '-' or '_'",
            name
        )))
    }
}

// --- Storage ---

/// Named forests kept as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Self {
        Self::new(default_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn forest_path(&self, name: &str) -> Result<PathBuf, TreeError> {
        check_forest_name(name)?;
        Ok(self.dir.join(format!("{}{}", name, FOREST_SUFFIX)))
    }

    /// List all forest names (without suffix), sorted.
    pub fn list_forests(&self) -> Result<Vec<String>, TreeError> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_suffix(FOREST_SUFFIX)
                    .filter(|n| check_forest_name(n).is_ok())
                    .map(|n| n.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.forest_path(name).is_ok_and(|p| p.exists())
    }

    /// Read a forest as the raw JSON text on disk.
    pub fn read_forest_raw(&self, name: &str) -> Result<String, TreeError> {
        Ok(fs::read_to_string(self.forest_path(name)?)?)
    }

    /// Read a forest and check its invariants.
    pub fn read_forest(&self, name: &str) -> Result<Forest, TreeError> {
        let raw = self.read_forest_raw(name)?;
        let forest: Forest = serde_json::from_str(&raw)?;
        forest.check_invariants()?;
        Ok(forest)
    }

    /// Write a forest. Each write goes through its own temp file in the data
    /// directory and is renamed into place, so a reader never observes a
    /// half-written file and concurrent writers never share a temp path.
    pub fn write_forest(&self, name: &str, forest: &Forest) -> Result<(), TreeError> {
        let path = self.forest_path(name)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(forest)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(forest = name, path = %path.display(), "wrote forest");
        Ok(())
    }

    /// Delete a forest by name. Returns whether a file was removed; deleting
    /// a missing forest is not an error.
    pub fn delete_forest(&self, name: &str) -> Result<bool, TreeError> {
        let path = self.forest_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        debug!(forest = name, "deleted forest");
        Ok(true)
    }

    // --- Settings ---

    fn settings_path(&self) -> PathBuf {
        self.dir.join("settings.json")
    }

    /// Missing or unreadable settings fall back to the defaults.
    pub fn read_settings(&self) -> Settings {
        fs::read_to_string(self.settings_path())
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn write_settings(&self, settings: &Settings) -> Result<(), TreeError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(self.settings_path(), json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Forest used when a request names none.
    pub default_forest: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Populate a missing forest with the demo systems on first read.
    pub seed_demo_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_forest: "default".to_string(),
            log_level: "info".to_string(),
            seed_demo_data: true,
        }
    }
}
