//! The one implicit session: cursor, editor, filesystem mutations and preview.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sanctuary_core::{Analyzer, FileSystemBackend, WorkspaceError};
use tracing::info;

use crate::cursor::DirectoryCursor;
use crate::editor::EditorSession;
use crate::error::ServerError;
use crate::preview::{PreviewServer, StartOutcome, StopOutcome};

pub struct Workspace {
    pub cursor: Arc<DirectoryCursor>,
    pub editor: EditorSession,
    pub preview: PreviewServer,
    fs: Arc<dyn FileSystemBackend>,
}

impl Workspace {
    pub async fn new(
        start_dir: &Path,
        fs: Arc<dyn FileSystemBackend>,
        analyzer: Arc<dyn Analyzer>,
        preview: PreviewServer,
    ) -> Result<Self, WorkspaceError> {
        let cursor = Arc::new(DirectoryCursor::new(start_dir, fs.clone()).await?);
        let editor = EditorSession::new(cursor.clone(), fs.clone(), analyzer);
        Ok(Self {
            cursor,
            editor,
            preview,
            fs,
        })
    }

    /// Create an empty file under the cursor. Empty names are ignored.
    pub async fn create_file(&self, name: &str) -> Result<Option<PathBuf>, WorkspaceError> {
        let Some(path) = self.target(name).await else {
            return Ok(None);
        };
        self.fs.create_file(&path).await?;
        info!("Created file {}", path.display());
        Ok(Some(path))
    }

    /// Create a directory under the cursor. Empty names are ignored.
    pub async fn create_dir(&self, name: &str) -> Result<Option<PathBuf>, WorkspaceError> {
        let Some(path) = self.target(name).await else {
            return Ok(None);
        };
        self.fs.create_dir(&path).await?;
        info!("Created directory {}", path.display());
        Ok(Some(path))
    }

    /// Delete a file or a whole directory tree under the cursor. Empty names are ignored.
    pub async fn delete(&self, name: &str) -> Result<Option<PathBuf>, WorkspaceError> {
        let Some(path) = self.target(name).await else {
            return Ok(None);
        };
        self.fs.remove_all(&path).await?;
        info!("Deleted {}", path.display());
        Ok(Some(path))
    }

    /// Start previewing the directory the cursor points at right now.
    pub async fn start_preview(&self) -> Result<StartOutcome, ServerError> {
        let root = self.cursor.current().await;
        self.preview.start(&root).await
    }

    pub async fn stop_preview(&self) -> StopOutcome {
        self.preview.stop().await
    }

    async fn target(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        Some(self.cursor.resolve(name).await)
    }
}
