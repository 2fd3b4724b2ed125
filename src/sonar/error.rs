use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SonarError {
    #[error("Quality gate was not computed within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid response from SonarQube: {message}")]
    InvalidResponse { message: String },

    #[error("SonarQube request failed: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
    },

    #[error("Analysis task {task_id} ended with status {status}")]
    TaskFailed { task_id: String, status: String },

    #[error("Report task file not found or lacks a task id: {0}")]
    MissingReportTask(PathBuf),
}

impl SonarError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
