//! Workspace file service
//!
//! Provides file system operations confined to the workspace root, with
//! proper error handling and validation.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A file in the working context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the workspace root
    pub name: String,
    /// Full file content
    pub content: String,
}

/// File system service
pub struct FileService;

impl FileService {
    /// Validate and canonicalize a path
    ///
    /// # Arguments
    /// * `path_str` - Path string to validate
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Canonicalized absolute path
    /// * `Err(AppError)` - If path is invalid, doesn't exist, or cannot be accessed
    pub fn validate_and_canonicalize_path(path_str: &str) -> Result<PathBuf, AppError> {
        let path = Path::new(path_str);

        if !path.exists() {
            return Err(AppError::FileNotFound(format!(
                "Path does not exist: {}",
                path_str
            )));
        }

        let canonical = path
            .canonicalize()
            .map_err(|e| AppError::InvalidPath(format!("Invalid path: {} - {}", path_str, e)))?;

        Ok(canonical)
    }

    /// Validate that a path is a directory
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Canonicalized absolute path
    /// * `Err(AppError)` - If path is not a directory or doesn't exist
    pub fn validate_directory_path(path_str: &str) -> Result<PathBuf, AppError> {
        let canonical = Self::validate_and_canonicalize_path(path_str)?;

        if !canonical.is_dir() {
            return Err(AppError::NotADirectory(format!(
                "Path is not a directory: {}",
                path_str
            )));
        }

        Ok(canonical)
    }

    /// Normalize a workspace-relative file name
    ///
    /// Rejects empty, absolute and parent-traversing names. `.` components and
    /// backslash separators are dropped, so `./src\\main.rs` becomes `src/main.rs`.
    pub fn normalize_name(name: &str) -> Result<String, AppError> {
        let unified = name.trim().replace('\\', "/");
        if unified.is_empty() {
            return Err(AppError::InvalidPath("File name cannot be empty".to_string()));
        }

        let mut parts = Vec::new();
        for component in Path::new(&unified).components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(AppError::InvalidPath(format!(
                        "File name must not contain '..': {}",
                        name
                    )))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(AppError::InvalidPath(format!(
                        "File name must be relative to the workspace: {}",
                        name
                    )))
                }
            }
        }

        if parts.is_empty() {
            return Err(AppError::InvalidPath(format!(
                "File name does not name a file: {}",
                name
            )));
        }

        Ok(parts.join("/"))
    }

    /// Resolve a file name to its location inside `root`
    ///
    /// Besides the lexical checks of [`FileService::normalize_name`], the
    /// deepest existing ancestor of the target is canonicalized so symlinks
    /// cannot lead outside the workspace.
    ///
    /// # Returns
    /// * `Ok((name, path))` - Normalized name and absolute path
    pub fn resolve(root: &Path, name: &str) -> Result<(String, PathBuf), AppError> {
        let normalized = Self::normalize_name(name)?;
        let canonical_root = root.canonicalize().map_err(|e| {
            AppError::InvalidPath(format!("Invalid workspace {}: {}", root.display(), e))
        })?;
        let target = canonical_root.join(&normalized);

        let mut existing = target.as_path();
        while !existing.exists() {
            match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            }
        }
        let resolved = existing
            .canonicalize()
            .map_err(|e| AppError::InvalidPath(format!("Invalid path: {} - {}", name, e)))?;
        if !resolved.starts_with(&canonical_root) {
            return Err(AppError::InvalidPath(format!(
                "File name escapes the workspace: {}",
                name
            )));
        }

        if target.is_dir() {
            return Err(AppError::InvalidPath(format!(
                "File name refers to a directory: {}",
                name
            )));
        }

        Ok((normalized, target))
    }

    /// Write `content` to `path`, creating parent directories as needed
    pub async fn write_file(path: &Path, content: &str) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        fs::write(path, content)
            .await
            .map_err(|e| io_error(path, e))
    }

    /// Read the content of `path`, or None when it no longer exists
    ///
    /// Invalid UTF-8 sequences are replaced.
    pub async fn read_file(path: &Path) -> Result<Option<String>, AppError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> AppError {
    match e.kind() {
        ErrorKind::PermissionDenied => {
            AppError::PermissionDenied(format!("{} - {}", path.display(), e))
        }
        ErrorKind::NotFound => AppError::FileNotFound(format!("{} - {}", path.display(), e)),
        _ => AppError::Internal(anyhow::anyhow!("I/O error on {}: {}", path.display(), e)),
    }
}
