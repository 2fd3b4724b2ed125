use super::tool::AnalysisTool;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A report file exists but is not well-formed XML
    #[error("Failed to parse {tool} output at {path}: {message}")]
    MalformedOutput {
        tool: AnalysisTool,
        path: PathBuf,
        message: String,
    },

    /// Aggregated counts that no summary phrasing can describe
    #[error(
        "Inconsistent {tool} totals: {total_violations} violation(s) across {files_with_violations} file(s)"
    )]
    Aggregation {
        tool: AnalysisTool,
        total_violations: u32,
        files_with_violations: u32,
    },

    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to stage {path}: {source}")]
    Staging { path: PathBuf, source: io::Error },
}
