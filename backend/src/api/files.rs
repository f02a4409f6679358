//! File API handlers
//!
//! Provides HTTP endpoints for reading and updating the working context.
//! Uses the file service layer for path validation and I/O.

use crate::api::utils::{RouterState, StatusResponse};
use crate::error::AppError;
use crate::services::files::{FileRecord, FileService};
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Working context listing
#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    /// Context files in order, with their current content
    pub files: Vec<FileRecord>,
}

/// Request to write files into the workspace
#[derive(Debug, Deserialize)]
pub struct SetFilesRequest {
    /// Files to create or overwrite
    pub files: Vec<FileRecord>,
}

/// GET /files - List the working context with current file contents
pub async fn get_files(
    State(state): State<RouterState>,
) -> Result<Json<FileListResponse>, AppError> {
    let (root, names) = {
        let app_state = state.app_state.read().await;
        (
            app_state.workspace_root().to_path_buf(),
            app_state.context_files().to_vec(),
        )
    };

    let mut files = Vec::with_capacity(names.len());
    for name in names {
        let path = match FileService::resolve(&root, &name) {
            Ok((_, path)) => path,
            Err(e) => {
                warn!(file = %name, error = %e, "Skipping context file");
                continue;
            }
        };
        match FileService::read_file(&path).await? {
            Some(content) => files.push(FileRecord { name, content }),
            None => warn!(file = %name, "Context file no longer exists on disk"),
        }
    }

    Ok(Json(FileListResponse { files }))
}

/// POST /files - Create or overwrite files and add them to the working context
///
/// Every name is validated before anything is written. If a write fails
/// midway, files already written keep their place in the working context.
pub async fn set_files(
    State(state): State<RouterState>,
    Json(request): Json<SetFilesRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let root = state.app_state.read().await.workspace_root().to_path_buf();

    let resolved = request
        .files
        .iter()
        .map(|file| FileService::resolve(&root, &file.name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut write_error = None;
    for ((name, path), file) in resolved.iter().zip(&request.files) {
        if let Err(e) = FileService::write_file(path, &file.content).await {
            warn!(file = %name, error = %e, "Failed to write file");
            write_error = Some(e);
            break;
        }
        let mut app_state = state.app_state.write().await;
        if app_state.add_context_file(name) {
            info!(file = %name, "Added file to working context");
        }
    }

    // Files written before a failure stay in the context and are persisted
    state.app_state.read().await.save()?;
    if let Some(e) = write_error {
        return Err(e);
    }

    let count = resolved.len();
    info!(count, "Updated files");
    Ok(Json(StatusResponse::success(format!(
        "Updated {} file(s)",
        count
    ))))
}

/// DELETE /files/*name - Remove a file from the working context
///
/// The file itself stays on disk.
pub async fn drop_file(
    State(state): State<RouterState>,
    Path(name): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let normalized = FileService::normalize_name(&name)?;

    let mut app_state = state.app_state.write().await;
    if !app_state.remove_context_file(&normalized) {
        return Err(AppError::FileNotFound(format!(
            "Not in working context: {}",
            normalized
        )));
    }
    app_state.save()?;

    info!(file = %normalized, "Removed file from working context");
    Ok(Json(StatusResponse::success(format!(
        "Removed {} from working context",
        normalized
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::utils::test_support::{create_test_state, EchoEngine};

    fn record(name: &str, content: &str) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_files_empty() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let response = get_files(State(state)).await.unwrap();
        assert!(response.files.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get_files() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let request = SetFilesRequest {
            files: vec![record("src/main.rs", "fn main() {}"), record("README.md", "# hi")],
        };

        let response = set_files(State(state.clone()), Json(request)).await.unwrap();
        assert_eq!(response.status, "success");
        assert_eq!(response.message, "Updated 2 file(s)");

        let listed = get_files(State(state)).await.unwrap();
        assert_eq!(
            listed.files,
            vec![record("src/main.rs", "fn main() {}"), record("README.md", "# hi")]
        );
    }

    #[tokio::test]
    async fn test_set_files_upserts_by_name() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        for content in ["v1", "v2"] {
            let request = SetFilesRequest {
                files: vec![record("notes.txt", content)],
            };
            set_files(State(state.clone()), Json(request)).await.unwrap();
        }
        // Same file through a different spelling
        let request = SetFilesRequest {
            files: vec![record("./notes.txt", "v3")],
        };
        set_files(State(state.clone()), Json(request)).await.unwrap();

        let listed = get_files(State(state)).await.unwrap();
        assert_eq!(listed.files, vec![record("notes.txt", "v3")]);
    }

    #[tokio::test]
    async fn test_set_files_rejects_whole_batch() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let request = SetFilesRequest {
            files: vec![record("ok.txt", "fine"), record("../escape.txt", "bad")],
        };

        match set_files(State(state.clone()), Json(request)).await.unwrap_err() {
            AppError::InvalidPath(_) => {}
            other => panic!("Expected InvalidPath error, got: {:?}", other),
        }

        let root = state.app_state.read().await.workspace_root().to_path_buf();
        assert!(!root.join("ok.txt").exists(), "Nothing should be written");
        assert!(get_files(State(state)).await.unwrap().files.is_empty());
    }

    #[tokio::test]
    async fn test_set_files_persists_context() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let request = SetFilesRequest {
            files: vec![record("a.txt", "a")],
        };
        set_files(State(state.clone()), Json(request)).await.unwrap();

        let saved = crate::state::SettingsStore::load_from_file(state.config.settings_path())
            .unwrap();
        assert_eq!(saved.context_files, vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_set_files_write_failure_persists_earlier_files() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        // The second file needs "first" to be a directory, but it is written as a file
        let request = SetFilesRequest {
            files: vec![record("first", "a"), record("first/second.txt", "b")],
        };

        assert!(set_files(State(state.clone()), Json(request)).await.is_err());

        assert_eq!(state.app_state.read().await.context_files(), ["first"]);
        let saved = crate::state::SettingsStore::load_from_file(state.config.settings_path())
            .unwrap();
        assert_eq!(saved.context_files, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn test_get_files_skips_deleted_file() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let request = SetFilesRequest {
            files: vec![record("gone.txt", "x"), record("kept.txt", "y")],
        };
        set_files(State(state.clone()), Json(request)).await.unwrap();

        let root = state.app_state.read().await.workspace_root().to_path_buf();
        std::fs::remove_file(root.join("gone.txt")).unwrap();

        let listed = get_files(State(state)).await.unwrap();
        assert_eq!(listed.files, vec![record("kept.txt", "y")]);
    }

    #[tokio::test]
    async fn test_drop_file() {
        let (state, _temp_dir) = create_test_state(EchoEngine { write: None }).await;
        let request = SetFilesRequest {
            files: vec![record("a.txt", "a")],
        };
        set_files(State(state.clone()), Json(request)).await.unwrap();

        drop_file(State(state.clone()), Path("a.txt".to_string()))
            .await
            .unwrap();
        assert!(get_files(State(state.clone())).await.unwrap().files.is_empty());

        let root = state.app_state.read().await.workspace_root().to_path_buf();
        assert!(root.join("a.txt").exists(), "File stays on disk");

        match drop_file(State(state), Path("a.txt".to_string())).await.unwrap_err() {
            AppError::FileNotFound(_) => {}
            other => panic!("Expected FileNotFound error, got: {:?}", other),
        }
    }
}
