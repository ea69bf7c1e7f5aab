use std::fmt;
use std::path::Path;

use async_trait::async_trait;

/// Opaque text produced by an external checker. Empty means clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport(String);

impl AnalysisReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs a static-analysis tool against exactly one file.
///
/// Implementations never fail: a missing tool or a non-zero exit is folded
/// into the report text.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, path: &Path, working_dir: &Path) -> AnalysisReport;
}
