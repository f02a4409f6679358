//! API utility functions
//!
//! Contains the shared router state and helpers used by API handlers for
//! validation and response formatting.

use crate::chat::{ChatDb, ChatEngine, CliChatEngine};
use crate::config::Config;
use crate::error::AppError;
use crate::services::files::FileService;
use crate::state::{AppState, ModelInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Maximum chat message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 100_000;

/// Maximum command length in characters
pub const MAX_COMMAND_LENGTH: usize = 10_000;

/// State shared by every handler
#[derive(Clone)]
pub struct RouterState {
    /// Model selection and working context
    pub app_state: Arc<RwLock<AppState>>,
    /// Chat transcript
    pub chat_db: Arc<ChatDb>,
    /// Produces chat replies
    pub engine: Arc<dyn ChatEngine>,
    /// Startup configuration
    pub config: Arc<Config>,
}

impl RouterState {
    /// Build the full state from configuration
    ///
    /// Validates the workspace, restores persisted settings (a corrupt
    /// settings file is logged and ignored) and opens the transcript database.
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let workspace_root =
            FileService::validate_directory_path(&config.workspace.root.to_string_lossy())?;
        info!(workspace = %workspace_root.display(), "Workspace resolved");

        let model = ModelInfo::new(config.model.model.clone(), config.model.provider.clone())
            .validated()
            .map_err(AppError::InvalidRequest)?;
        let mut app_state =
            AppState::new(workspace_root, model).with_settings_path(config.settings_path());
        match app_state.load() {
            Ok(true) => info!(
                model = %app_state.model().model,
                context_files = app_state.context_files().len(),
                "Restored settings from {}",
                config.settings_path().display()
            ),
            Ok(false) => {}
            Err(e) => warn!("Failed to load settings, using defaults: {}", e),
        }

        let chat_db = ChatDb::new(&config.chat_db_path()).await?;
        let engine = CliChatEngine::new(config.chat.clone());

        Ok(Self {
            app_state: Arc::new(RwLock::new(app_state)),
            chat_db: Arc::new(chat_db),
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }
}

/// `{status, message}` response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    /// "success" or "error"
    pub status: String,
    /// Human-readable message
    pub message: String,
}

impl StatusResponse {
    /// Successful outcome with a message
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Validate a free-text request field
///
/// # Returns
/// * `Ok(())` - Text is valid
/// * `Err(AppError)` - Text is empty (after trimming) or longer than `max_len` characters
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidRequest(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::InvalidRequest(format!(
            "{} exceeds maximum length of {} characters",
            field, max_len
        )));
    }
    Ok(())
}
