//! Stateless mediator for the open file.
//!
//! Which file is "open" lives only in the browser; every call here is keyed
//! on the path it is given and nothing is remembered between calls.

use std::sync::Arc;

use sanctuary_core::{AnalysisReport, Analyzer, FileSystemBackend, WorkspaceError};
use tracing::debug;

use crate::cursor::DirectoryCursor;

pub struct EditorSession {
    cursor: Arc<DirectoryCursor>,
    fs: Arc<dyn FileSystemBackend>,
    analyzer: Arc<dyn Analyzer>,
}

impl EditorSession {
    pub fn new(
        cursor: Arc<DirectoryCursor>,
        fs: Arc<dyn FileSystemBackend>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            cursor,
            fs,
            analyzer,
        }
    }

    /// Read a file. Any failure reads as empty content.
    pub async fn open(&self, path: &str) -> Vec<u8> {
        let path = self.cursor.resolve(path).await;
        match self.fs.read_file(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("Open of {} read as empty: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Overwrite a file with `content`, creating it if needed.
    pub async fn save(&self, path: &str, content: &[u8]) -> Result<(), WorkspaceError> {
        if path.is_empty() {
            return Err(WorkspaceError::InvalidPath("no file is open".to_string()));
        }
        let path = self.cursor.resolve(path).await;
        self.fs.write_file(&path, content).await
    }

    /// Run the analyzer against `path` from the cursor directory.
    /// Without a path there is no file to check and the tool is not started.
    pub async fn check(&self, path: &str) -> AnalysisReport {
        if path.is_empty() {
            return AnalysisReport::new("no file is open\n");
        }
        let working_dir = self.cursor.current().await;
        let path = working_dir.join(path);
        self.analyzer.analyze(&path, &working_dir).await
    }
}
