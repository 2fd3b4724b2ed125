mod analysis_service;
mod primary_build;
mod result_collection;
mod summary_publish;
mod test_results;
mod tool_check;

pub use analysis_service::OptionalAnalysisStage;
pub use primary_build::PrimaryBuildStage;
pub use result_collection::ResultCollectionStage;
pub use summary_publish::SummaryPublishStage;
pub use test_results::TestResultsStage;
pub use tool_check::ToolCheckStage;

use crate::runner::issues::parse_issue;
use crate::sink::ArtifactSink;
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Line callback forwarding compiler diagnostics to the sink's issue channel
fn issue_reporter(sink: Arc<dyn ArtifactSink>) -> impl Fn(&str) + Send + Sync {
    move |line: &str| {
        if let Some(issue) = parse_issue(line) {
            if let Err(e) = sink.report_issue(&issue) {
                warn!(path = %issue.source_path, "Failed to report build issue: {}", e);
            }
        }
    }
}

/// Executable resolved by the tool check
fn tool_program(program: &Option<PathBuf>) -> Result<PathBuf> {
    program
        .clone()
        .ok_or_else(|| anyhow!("Build tool was not resolved by the tool check"))
}
