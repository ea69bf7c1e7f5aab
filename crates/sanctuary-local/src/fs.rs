use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sanctuary_core::{DirectoryEntry, FileSystemBackend, WorkspaceError};
use tokio::fs;
use tracing::{debug, instrument};

/// Filesystem backend operating directly on the real filesystem.
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystemBackend for LocalFileSystem {
    #[instrument(skip(self), level = "debug")]
    async fn list_dir(&self, path: &Path) -> Result<Vec<DirectoryEntry>, WorkspaceError> {
        let mut read_dir = fs::read_dir(path)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))?;

        let mut entries = Vec::new();
        loop {
            let entry = match read_dir.next_entry().await {
                Ok(Some(e)) => e,
                Ok(None) => break,
                Err(e) => {
                    debug!("Stopped reading {}: {}", path.display(), e);
                    break;
                }
            };

            // Entries deleted between readdir and stat are skipped
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(_) => continue,
            };

            let is_dir = metadata.is_dir();
            entries.push(DirectoryEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
                is_dir,
                size_bytes: if is_dir { 0 } else { metadata.len() },
                modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        debug!("Listed {} entries in {}", entries.len(), path.display());
        Ok(entries)
    }

    #[instrument(skip(self), level = "debug")]
    async fn resolve_dir(&self, path: &Path) -> Result<PathBuf, WorkspaceError> {
        let canonical = fs::canonicalize(path)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))?;

        let metadata = fs::metadata(&canonical)
            .await
            .map_err(|e| WorkspaceError::from_io(&canonical, e))?;
        if !metadata.is_dir() {
            return Err(WorkspaceError::NotADirectory(canonical.display().to_string()));
        }

        // A directory we cannot read is not a usable cursor target
        fs::read_dir(&canonical)
            .await
            .map_err(|e| WorkspaceError::from_io(&canonical, e))?;

        Ok(canonical)
    }

    #[instrument(skip(self), level = "debug")]
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, WorkspaceError> {
        fs::read(path)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))
    }

    #[instrument(skip(self, content), level = "debug", fields(content_len = content.len()))]
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WorkspaceError> {
        fs::write(path, content)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_file(&self, path: &Path) -> Result<(), WorkspaceError> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map(|_| ())
            .map_err(|e| WorkspaceError::from_io(path, e))
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_dir(&self, path: &Path) -> Result<(), WorkspaceError> {
        fs::create_dir(path)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_all(&self, path: &Path) -> Result<(), WorkspaceError> {
        if !names_an_entry(path) {
            return Err(WorkspaceError::InvalidPath(path.display().to_string()));
        }

        // symlink_metadata so a link to a directory removes the link, not the target
        let metadata = fs::symlink_metadata(path)
            .await
            .map_err(|e| WorkspaceError::from_io(path, e))?;

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };
        result.map_err(|e| WorkspaceError::from_io(path, e))
    }
}

/// True when the last raw segment of `path` is a real name.
///
/// `Path::components` and `Path::file_name` both drop a trailing `.`, so
/// `dir/.` would otherwise pass as `dir` and have its contents removed.
fn names_an_entry(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim_end_matches(std::path::is_separator);
    let last = trimmed.rsplit(std::path::is_separator).next().unwrap_or("");
    !matches!(last, "" | "." | "..") && path.file_name().is_some()
}
