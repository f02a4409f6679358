// Gateway state management
// Contains the model selection, the working context and where they are persisted

use super::model::ModelInfo;
use super::persistence::{GatewaySettings, PersistenceError, SettingsStore};
use std::path::{Path, PathBuf};

/// Main application state
/// Shared between handlers behind `Arc<RwLock<_>>`
#[derive(Debug, Clone)]
pub struct AppState {
    /// Canonical workspace root; files and commands are confined to it
    workspace_root: PathBuf,
    /// Currently selected model
    model: ModelInfo,
    /// Working context file names in first-insertion order, no duplicates
    context_files: Vec<String>,
    /// Where settings are saved (None = in-memory only)
    settings_path: Option<PathBuf>,
}

impl AppState {
    /// Create a new in-memory state
    pub fn new(workspace_root: PathBuf, model: ModelInfo) -> Self {
        Self {
            workspace_root,
            model,
            context_files: Vec::new(),
            settings_path: None,
        }
    }

    /// Persist changes to `path`
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Workspace root directory
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Currently selected model
    pub fn model(&self) -> &ModelInfo {
        &self.model
    }

    /// Persist a new model selection, then switch to it
    ///
    /// The current selection is left untouched when saving fails.
    pub fn update_model(&mut self, model: ModelInfo) -> Result<(), PersistenceError> {
        if let Some(path) = &self.settings_path {
            let settings = GatewaySettings::new(model.clone(), self.context_files.clone());
            SettingsStore::save_to_file(&settings, path)?;
        }
        self.model = model;
        Ok(())
    }

    /// Working context file names, in order
    pub fn context_files(&self) -> &[String] {
        &self.context_files
    }

    /// Add a name to the working context
    /// Returns true if the name was not already present
    pub fn add_context_file(&mut self, name: &str) -> bool {
        if self.context_files.iter().any(|existing| existing == name) {
            false
        } else {
            self.context_files.push(name.to_string());
            true
        }
    }

    /// Remove a name from the working context
    /// Returns true if the name was present
    pub fn remove_context_file(&mut self, name: &str) -> bool {
        let before = self.context_files.len();
        self.context_files.retain(|existing| existing != name);
        before != self.context_files.len()
    }

    /// Snapshot of the persistable state
    pub fn settings(&self) -> GatewaySettings {
        GatewaySettings::new(self.model.clone(), self.context_files.clone())
    }

    /// Restore a previously saved snapshot
    ///
    /// Duplicate names in the snapshot are collapsed.
    pub fn apply_settings(&mut self, settings: GatewaySettings) {
        self.model = settings.model;
        self.context_files.clear();
        for name in &settings.context_files {
            self.add_context_file(name);
        }
    }

    /// Load settings from the configured path
    /// Returns false when no settings path is configured or the file doesn't exist yet
    pub fn load(&mut self) -> Result<bool, PersistenceError> {
        let Some(path) = self.settings_path.as_ref() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        let settings = SettingsStore::load_from_file(path)?;
        self.apply_settings(settings);
        Ok(true)
    }

    /// Save settings to the configured path (no-op when in-memory only)
    pub fn save(&self) -> Result<(), PersistenceError> {
        match &self.settings_path {
            Some(path) => SettingsStore::save_to_file(&self.settings(), path),
            None => Ok(()),
        }
    }
}
