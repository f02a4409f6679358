// Settings persistence module
// Handles saving and loading the model selection and working context to/from files

use super::model::ModelInfo;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Current settings file format version
pub const SETTINGS_VERSION: u32 = 1;

/// Error types for persistence operations
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    /// File was written by an incompatible version
    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),
}

/// Serializable snapshot of the gateway state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Version of the settings format (for future migration support)
    pub version: u32,
    /// Selected model
    pub model: ModelInfo,
    /// Working context file names, in order
    #[serde(default)]
    pub context_files: Vec<String>,
}

impl GatewaySettings {
    /// Create a snapshot in the current format
    pub fn new(model: ModelInfo, context_files: Vec<String>) -> Self {
        Self {
            version: SETTINGS_VERSION,
            model,
            context_files,
        }
    }
}

/// Settings file operations
pub struct SettingsStore;

impl SettingsStore {
    /// Save settings to a JSON file, creating the parent directory if needed
    pub fn save_to_file<P: AsRef<Path>>(
        settings: &GatewaySettings,
        path: P,
    ) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        // Write to a sibling file first so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<GatewaySettings, PersistenceError> {
        let content = fs::read_to_string(path)?;
        let settings: GatewaySettings = serde_json::from_str(&content)?;

        if settings.version != SETTINGS_VERSION {
            return Err(PersistenceError::UnsupportedVersion(settings.version));
        }

        Ok(settings)
    }
}
