//! The single "current directory" the browsing UI is rooted at.
//!
//! The cursor is an owned field rather than the process cwd, so resolving a
//! relative path never depends on ambient state. Navigation holds the write
//! lock across validation, making each read-modify-write atomic; between
//! concurrent navigations the last one to finish wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sanctuary_core::{DirectoryListing, FileSystemBackend, WorkspaceError};
use tokio::sync::RwLock;
use tracing::{debug, info};

pub struct DirectoryCursor {
    current: RwLock<PathBuf>,
    fs: Arc<dyn FileSystemBackend>,
}

impl DirectoryCursor {
    /// Create a cursor rooted at `start`, which must be a readable directory.
    pub async fn new(
        start: &Path,
        fs: Arc<dyn FileSystemBackend>,
    ) -> Result<Self, WorkspaceError> {
        let start = fs.resolve_dir(start).await?;
        info!("Directory cursor starts at {}", start.display());
        Ok(Self {
            current: RwLock::new(start),
            fs,
        })
    }

    pub async fn current(&self) -> PathBuf {
        self.current.read().await.clone()
    }

    /// Resolve `path` against the cursor. Absolute paths are returned as given.
    pub async fn resolve(&self, path: &str) -> PathBuf {
        self.current.read().await.join(path)
    }

    /// Move the cursor to `target`, relative to the current directory or absolute.
    ///
    /// An empty target leaves the cursor alone. On failure the cursor keeps its
    /// previous value and the error is handed back for logging only.
    pub async fn navigate(&self, target: &str) -> Result<PathBuf, WorkspaceError> {
        let mut current = self.current.write().await;
        if target.is_empty() {
            return Ok(current.clone());
        }

        let candidate = current.join(target);
        let resolved = self.fs.resolve_dir(&candidate).await.map_err(|e| {
            debug!("Navigation to {} rejected: {}", candidate.display(), e);
            e
        })?;

        debug!("Cursor {} -> {}", current.display(), resolved.display());
        *current = resolved.clone();
        Ok(resolved)
    }

    /// Move the cursor to the invoking user's home directory.
    pub async fn home(&self) -> Result<PathBuf, WorkspaceError> {
        let home = dirs::home_dir()
            .ok_or_else(|| WorkspaceError::NotFound("home directory".to_string()))?;
        self.navigate(&home.to_string_lossy()).await
    }

    /// Fresh, non-recursive read of the cursor directory.
    pub async fn listing(&self) -> Result<DirectoryListing, WorkspaceError> {
        let path = self.current().await;
        let entries = self.fs.list_dir(&path).await?;
        Ok(DirectoryListing::new(path, entries))
    }
}
