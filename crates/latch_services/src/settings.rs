//! Scripting settings
//!
//! Optional JSON file controlling where script modules are looked up.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit settings file.
pub const SETTINGS_ENV_VAR: &str = "LATCH_SCRIPT_SETTINGS";

/// Settings file looked up next to the executable when the env var is unset.
pub const SETTINGS_FILE_NAME: &str = "latch_script.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Script bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Overrides the executable directory as the base for relative module paths.
    pub base_dir: Option<PathBuf>,
    /// File extension of script modules, without the dot.
    pub module_extension: String,
    /// How many exported type names to list when a lookup misses.
    pub diagnostic_type_sample: usize,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            base_dir: None,
            module_extension: std::env::consts::DLL_EXTENSION.to_string(),
            diagnostic_type_sample: 16,
        }
    }
}

impl ScriptSettings {
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locate and load settings.
    ///
    /// `LATCH_SCRIPT_SETTINGS` wins; otherwise `latch_script.json` inside
    /// `exe_dir` is used if it exists. No file at all yields defaults.
    pub fn discover(exe_dir: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = std::env::var_os(SETTINGS_ENV_VAR) {
            return Self::load_from(Path::new(&path));
        }

        match exe_dir.map(|dir| dir.join(SETTINGS_FILE_NAME)) {
            Some(candidate) if candidate.is_file() => {
                tracing::debug!(target: "latch_services", "Loading settings from {}", candidate.display());
                Self::load_from(&candidate)
            }
            _ => Ok(Self::default()),
        }
    }
}
