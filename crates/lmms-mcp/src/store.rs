//! Project file access with one edit lock per file.
//!
//! Every tool call that touches a project goes through [`ProjectStore`], so
//! two concurrent edits of the same file run decode, mutate and encode one
//! after the other instead of overwriting each other.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lmms_project::format::{decode_bytes, encode_bytes};
use lmms_project::{Project, ProjectFormat};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::ToolError;

#[derive(Debug, Default)]
pub struct ProjectStore {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the edit lock for `path`. Paths naming the same file share a lock.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let key = canonical(path).await;
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map references are neither held nor awaited.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    /// Decode `path` and hand the project to `f`.
    pub async fn read<T>(
        &self,
        path: &Path,
        f: impl FnOnce(&Project) -> Result<T, ToolError>,
    ) -> Result<T, ToolError> {
        let _guard = self.lock(path).await;
        let project = load(path).await?;
        f(&project)
    }

    /// Decode `path`, let `f` edit the project, and write it back. Nothing is
    /// written when `f` fails.
    pub async fn modify<T>(
        &self,
        path: &Path,
        f: impl FnOnce(&mut Project) -> Result<T, ToolError>,
    ) -> Result<T, ToolError> {
        let _guard = self.lock(path).await;
        let mut project = load(path).await?;
        let out = f(&mut project)?;
        save(path, &project).await?;
        tracing::debug!(path = %path.display(), "project updated");
        Ok(out)
    }

    /// Write a new project to `path`, creating parent directories. An
    /// existing file is only replaced when `overwrite` is set.
    pub async fn create(
        &self,
        path: &Path,
        project: &Project,
        overwrite: bool,
    ) -> Result<(), ToolError> {
        let _guard = self.lock(path).await;
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| ToolError::io(format!("checking {}", path.display()), e))?;
        if exists && !overwrite {
            return Err(ToolError::invalid(format!(
                "{} already exists; pass overwrite=true to replace it",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::io(format!("creating {}", parent.display()), e))?;
        }
        save(path, project).await?;
        tracing::info!(path = %path.display(), "project created");
        Ok(())
    }

    /// Raw XML text of `path`, decompressed when needed.
    pub async fn read_xml(&self, path: &Path) -> Result<String, ToolError> {
        let _guard = self.lock(path).await;
        let data = read_bytes(path).await?;
        let xml = ProjectFormat::from_path(path).unwrap_bytes(&data)?;
        String::from_utf8(xml).map_err(|e| ToolError::Decode(e.into()))
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, ToolError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ToolError::io(format!("reading {}", path.display()), e))
}

async fn load(path: &Path) -> Result<Project, ToolError> {
    let data = read_bytes(path).await?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(decode_bytes(&data, ProjectFormat::from_path(path), &name)?)
}

async fn save(path: &Path, project: &Project) -> Result<(), ToolError> {
    let data = encode_bytes(project, ProjectFormat::from_path(path))?;
    tokio::fs::write(path, data)
        .await
        .map_err(|e| ToolError::io(format!("writing {}", path.display()), e))
}

/// Lock key for `path`: the canonical path when the file exists, otherwise
/// the canonical parent joined with the file name.
async fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = tokio::fs::canonicalize(path).await {
        return resolved;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (tokio::fs::canonicalize(parent).await, path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}
