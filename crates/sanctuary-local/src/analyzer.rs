use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use sanctuary_core::{AnalysisReport, Analyzer};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Analyzer that shells out to an external tool, e.g. `go vet <file>`.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace. The first word is the program.
    /// An empty command line yields an analyzer that reports a spawn failure.
    pub fn from_command_line(command_line: &str) -> Self {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        Self::new(program, words.collect())
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl Analyzer for CommandAnalyzer {
    #[instrument(skip(self), level = "debug", fields(program = %self.program))]
    async fn analyze(&self, path: &Path, working_dir: &Path) -> AnalysisReport {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) => {
                let mut combined = output.stdout;
                combined.extend_from_slice(&output.stderr);
                debug!(
                    "{} exited with {} ({} bytes of output)",
                    self.program,
                    output.status,
                    combined.len()
                );
                AnalysisReport::new(String::from_utf8_lossy(&combined))
            }
            Err(e) => {
                warn!("Failed to run analyzer {:?}: {}", self.program, e);
                AnalysisReport::new(format!("failed to run `{}`: {}\n", self.program, e))
            }
        }
    }
}
