use std::io;
use std::path::Path;

/// Errors raised by filesystem-facing operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl WorkspaceError {
    /// Classify an I/O error raised while operating on `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let display = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(display),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(display),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(display),
            _ => Self::Io {
                path: display,
                source: err,
            },
        }
    }
}
