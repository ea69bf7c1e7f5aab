//! Core traits and types for the sanctuary workspace manager.
//!
//! This crate defines the seams between the session logic and the operating system:
//! - `FileSystemBackend`: list, read, write, create and delete on the real filesystem
//! - `Analyzer`: run an external checker against a single file
//! - `WorkspaceError`: the filesystem error taxonomy shared by both

mod analysis;
mod error;
mod listing;

pub use analysis::{AnalysisReport, Analyzer};
pub use error::WorkspaceError;
pub use listing::{DirectoryEntry, DirectoryListing, FileSystemBackend};
