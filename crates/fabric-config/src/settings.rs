//! Process-wide settings and their on-disk store

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Directory under the user config dir that holds our files
pub const APP_DIR: &str = "fabric-step";

/// Settings file name inside [`APP_DIR`]
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Global settings shared by every invocation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FabricSettings {
    /// Path or name of the fabric executable (`fab`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric_executable: Option<String>,
}

impl FabricSettings {
    /// Settings with the given executable configured
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            fabric_executable: Some(executable.into()),
        }
    }
}

/// YAML-backed persistence for [`FabricSettings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_path`](Self::default_path)
    pub fn at_default_location() -> Self {
        Self::new(Self::default_path())
    }

    /// `<user config dir>/fabric-step/settings.yaml`, falling back to the current directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(SETTINGS_FILE)
    }

    /// File this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file; a missing file yields defaults
    pub fn load(&self) -> Result<FabricSettings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(FabricSettings::default());
            }
            Err(e) => return Err(ConfigError::ReadError(e)),
        };

        if content.trim().is_empty() {
            return Ok(FabricSettings::default());
        }

        let settings = serde_yaml::from_str(&content)?;
        debug!(path = %self.path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Write `settings`, creating the parent directory if needed
    ///
    /// The file is written next to its destination and renamed into place, so a
    /// concurrent `load` sees either the old or the new settings.
    pub fn save(&self, settings: &FabricSettings) -> Result<()> {
        let write_err = |source| ConfigError::WriteError {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let yaml = serde_yaml::to_string(settings)?;
        let staging = self.path.with_extension("yaml.tmp");
        std::fs::write(&staging, yaml).map_err(write_err)?;
        std::fs::rename(&staging, &self.path).map_err(write_err)?;

        info!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

/// Settings loaded once at startup and replaced only through [`save`](Self::save)
#[derive(Debug)]
pub struct GlobalSettings {
    store: SettingsStore,
    current: RwLock<FabricSettings>,
}

impl GlobalSettings {
    /// Load from `store`
    pub fn load(store: SettingsStore) -> Result<Self> {
        let current = store.load()?;
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    /// Copy of the settings as of now, for injecting into one invocation
    pub fn snapshot(&self) -> FabricSettings {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Persist `settings`, then make them current
    ///
    /// In-memory settings are left untouched if the write fails.
    pub fn save(&self, settings: FabricSettings) -> Result<()> {
        self.store.save(&settings)?;
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
        Ok(())
    }

    /// Backing store
    pub fn store(&self) -> &SettingsStore {
        &self.store
    }
}
