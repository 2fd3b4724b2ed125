//! SonarQube analysis service
//!
//! After the scanner has uploaded its report, the server computes the
//! analysis asynchronously. [`QualityGateWatcher`] polls the compute-engine
//! task until it finishes, then asks for the quality gate verdict.

mod client;
mod error;
mod mock;
mod watcher;

pub use client::{parse_quality_gate, parse_report_task, parse_task_status, SonarQubeClient};
pub use error::SonarError;
pub use mock::MockAnalysisService;
pub use watcher::{QualityGateWatcher, WatchState};

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Compute-engine task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Success { analysis_id: String },
    Error { status: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityGateStatus {
    Ok,
    Warn,
    Error,
    None,
}

impl QualityGateStatus {
    pub fn from_api(status: &str) -> Option<Self> {
        match status {
            "OK" => Some(Self::Ok),
            "WARN" => Some(Self::Warn),
            "ERROR" => Some(Self::Error),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }

    /// Only an explicit `ERROR` fails the build
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// One quality gate condition as reported by `/api/qualitygates/project_status`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateCondition {
    pub status: String,
    #[serde(default)]
    pub metric_key: String,
    #[serde(default)]
    pub comparator: Option<String>,
    #[serde(default)]
    pub error_threshold: Option<String>,
    #[serde(default)]
    pub actual_value: Option<String>,
}

impl GateCondition {
    pub fn is_failed(&self) -> bool {
        self.status != "OK"
    }
}

impl fmt::Display for GateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {} (threshold: {} {})",
            self.metric_key,
            self.actual_value.as_deref().unwrap_or("unknown"),
            self.comparator.as_deref().unwrap_or("?"),
            self.error_threshold.as_deref().unwrap_or("none")
        )
    }
}

/// Gate verdict plus the conditions that did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityGateReport {
    pub status: QualityGateStatus,
    pub failed_conditions: Vec<GateCondition>,
}

impl QualityGateReport {
    pub fn new(status: QualityGateStatus) -> Self {
        Self {
            status,
            failed_conditions: Vec::new(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Identifies the task the scanner submitted for this run
    async fn submit_task(&self) -> Result<TaskId, SonarError>;

    async fn poll_task_status(&self, task_id: &TaskId) -> Result<TaskStatus, SonarError>;

    async fn fetch_analysis_details(&self, analysis_id: &str)
        -> Result<QualityGateReport, SonarError>;
}
