//! Edit capture
//!
//! Snapshots the working context before the assistant runs so the files it
//! changed can be reported with the reply.

use crate::error::AppError;
use crate::services::files::{FileRecord, FileService};
use std::collections::HashMap;
use std::path::Path;

/// Content of each context file at one point in time (None = absent)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
    contents: HashMap<String, Option<String>>,
}

impl ContextSnapshot {
    /// Read every named file under `root`
    pub async fn capture(root: &Path, names: &[String]) -> Result<Self, AppError> {
        let mut contents = HashMap::with_capacity(names.len());
        for name in names {
            let (_, path) = FileService::resolve(root, name)?;
            contents.insert(name.clone(), FileService::read_file(&path).await?);
        }
        Ok(Self { contents })
    }

    /// Files whose content in `after` differs from this snapshot
    ///
    /// Results follow the order of `names`; files deleted by the assistant
    /// are not reported.
    pub fn edits(&self, after: &ContextSnapshot, names: &[String]) -> Vec<FileRecord> {
        names
            .iter()
            .filter_map(|name| {
                let new = after.contents.get(name)?.as_ref()?;
                let old = self.contents.get(name).and_then(Option::as_ref);
                (old != Some(new)).then(|| FileRecord {
                    name: name.clone(),
                    content: new.clone(),
                })
            })
            .collect()
    }
}
