use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::WorkspaceError;

/// A file or folder directly under a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// File/folder name
    pub name: String,
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Whether this is a folder
    pub is_dir: bool,
    /// Size in bytes (0 for folders)
    pub size_bytes: u64,
    /// Last modified time, when the platform reports one
    pub modified_at: Option<DateTime<Utc>>,
}

/// Snapshot of a directory taken at request time. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn new(path: PathBuf, mut entries: Vec<DirectoryEntry>) -> Self {
        entries.sort_by(compare_entries);
        Self { path, entries }
    }

    /// Listing with no entries, used when the cursor directory vanished under us.
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}

/// Folders first, then case-insensitive by name.
fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Backend trait wrapping the OS filesystem primitives.
///
/// Every operation targets an explicit path; implementations hold no cursor
/// and need no shared locking.
#[async_trait]
pub trait FileSystemBackend: Send + Sync {
    /// List the immediate children of a directory.
    async fn list_dir(&self, path: &Path) -> Result<Vec<DirectoryEntry>, WorkspaceError>;

    /// Canonicalize `path` and confirm it is a readable directory.
    async fn resolve_dir(&self, path: &Path) -> Result<PathBuf, WorkspaceError>;

    /// Read a whole file.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, WorkspaceError>;

    /// Overwrite a file, creating it if absent.
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WorkspaceError>;

    /// Create an empty file. Fails if anything already exists at `path`.
    async fn create_file(&self, path: &Path) -> Result<(), WorkspaceError>;

    /// Create a single directory (parents must exist).
    async fn create_dir(&self, path: &Path) -> Result<(), WorkspaceError>;

    /// Remove a file, or a directory and everything below it.
    async fn remove_all(&self, path: &Path) -> Result<(), WorkspaceError>;
}
