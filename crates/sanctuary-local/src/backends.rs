use std::sync::Arc;

use sanctuary_core::{Analyzer, FileSystemBackend};

use crate::analyzer::CommandAnalyzer;
use crate::fs::LocalFileSystem;

/// Create the filesystem and analyzer backends.
/// `analyzer_command` is a whitespace-separated command line such as `go vet`.
pub fn create_backends(
    analyzer_command: &str,
) -> (Arc<dyn FileSystemBackend>, Arc<dyn Analyzer>) {
    let fs: Arc<dyn FileSystemBackend> = Arc::new(LocalFileSystem::new());
    let analyzer: Arc<dyn Analyzer> = Arc::new(CommandAnalyzer::from_command_line(analyzer_command));
    (fs, analyzer)
}
