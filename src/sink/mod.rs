//! Artifact and summary sink
//!
//! Everything the run hands back to the pipeline server goes through
//! [`ArtifactSink`]: artifact uploads, the summary attachment, compiler
//! issues, test results and the final task result.

mod commands;
mod recording;

pub use commands::PipelineCommandSink;
pub use recording::{RecordingSink, SinkEvent};

use crate::pipeline::TaskResult;
use crate::runner::BuildIssue;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Attachment type the pipeline renders as a build summary section
pub const SUMMARY_ATTACHMENT_TYPE: &str = "Distributedtask.Core.Summary";

/// Attachment name of the code analysis summary
pub const SUMMARY_ATTACHMENT_NAME: &str = "Code Analysis Report";

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write pipeline command: {0}")]
    Write(#[from] io::Error),

    #[error("Path does not exist: {0}")]
    MissingPath(PathBuf),
}

/// Narrow contract with the pipeline server.
///
/// Calls are fire-and-forget: completion on the server side is not awaited.
pub trait ArtifactSink: Send + Sync {
    /// Uploads `directory` as one artifact
    fn upload_artifact(
        &self,
        container: &str,
        artifact_name: &str,
        directory: &Path,
    ) -> Result<(), SinkError>;

    fn add_attachment(
        &self,
        attachment_type: &str,
        name: &str,
        path: &Path,
    ) -> Result<(), SinkError>;

    fn report_issue(&self, issue: &BuildIssue) -> Result<(), SinkError>;

    /// Publishes JUnit result files as one merged test run
    fn publish_test_results(&self, files: &[PathBuf]) -> Result<(), SinkError>;

    fn set_result(&self, result: TaskResult, message: &str) -> Result<(), SinkError>;
}
