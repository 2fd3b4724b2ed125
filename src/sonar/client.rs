use super::{
    AnalysisService, GateCondition, QualityGateReport, QualityGateStatus, SonarError, TaskId,
    TaskStatus,
};
use crate::config::SonarConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the SonarQube web API
pub struct SonarQubeClient {
    host_url: String,
    username: Option<String>,
    password: Option<String>,
    report_task_path: PathBuf,
    http_client: Client,
}

#[derive(Deserialize)]
struct CeTaskResponse {
    task: Option<CeTask>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CeTask {
    status: String,
    analysis_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectStatusResponse {
    project_status: Option<ProjectStatus>,
}

#[derive(Deserialize)]
struct ProjectStatus {
    status: String,
    #[serde(default)]
    conditions: Vec<GateCondition>,
}

impl SonarQubeClient {
    /// `report_task_path` is the `report-task.txt` the scanner leaves in the
    /// build output directory
    pub fn new(config: &SonarConfig, report_task_path: PathBuf) -> Result<Self, SonarError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SonarError::Http {
                message: format!("Failed to build HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            host_url: config.host_url.trim_end_matches('/').to_string(),
            username: config.username.clone().filter(|u| !u.is_empty()),
            password: config.password.clone(),
            report_task_path,
            http_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SonarError> {
        let url = format!("{}{}", self.host_url, path);
        debug!(url = %url, "Querying SonarQube");

        let mut request = self.http_client.get(&url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            error!(url = %url, "SonarQube request error: {}", e);
            SonarError::Http {
                message: e.to_string(),
                status_code: None,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, "SonarQube returned an error status");
            return Err(SonarError::Http {
                message: format!("HTTP {}: {}", status, body),
                status_code: Some(status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| SonarError::Http {
            message: e.to_string(),
            status_code: Some(status.as_u16()),
        })?;
        serde_json::from_str(&body)
            .map_err(|e| SonarError::invalid_response(format!("JSON parse error: {}", e)))
    }
}

/// Extracts `ceTaskId` from the scanner's `report-task.txt`
pub fn parse_report_task(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        (key.trim() == "ceTaskId" && !value.trim().is_empty()).then(|| value.trim().to_string())
    })
}

/// Interprets an `/api/ce/task` response body
pub fn parse_task_status(body: &str) -> Result<TaskStatus, SonarError> {
    let response: CeTaskResponse = serde_json::from_str(body)
        .map_err(|e| SonarError::invalid_response(format!("JSON parse error: {}", e)))?;
    task_status(response)
}

fn task_status(response: CeTaskResponse) -> Result<TaskStatus, SonarError> {
    let task = response
        .task
        .ok_or_else(|| SonarError::invalid_response("missing 'task'"))?;

    match task.status.as_str() {
        "PENDING" | "IN_PROGRESS" => Ok(TaskStatus::Pending),
        "SUCCESS" => task
            .analysis_id
            .map(|analysis_id| TaskStatus::Success { analysis_id })
            .ok_or_else(|| SonarError::invalid_response("successful task has no 'analysisId'")),
        "FAILED" | "CANCELED" => Ok(TaskStatus::Error {
            status: task.status,
        }),
        other => Err(SonarError::invalid_response(format!(
            "unknown task status '{}'",
            other
        ))),
    }
}

/// Interprets an `/api/qualitygates/project_status` response body
pub fn parse_quality_gate(body: &str) -> Result<QualityGateReport, SonarError> {
    let response: ProjectStatusResponse = serde_json::from_str(body)
        .map_err(|e| SonarError::invalid_response(format!("JSON parse error: {}", e)))?;
    quality_gate(response)
}

fn quality_gate(response: ProjectStatusResponse) -> Result<QualityGateReport, SonarError> {
    let project_status = response
        .project_status
        .ok_or_else(|| SonarError::invalid_response("missing 'projectStatus'"))?;

    let status = QualityGateStatus::from_api(&project_status.status).ok_or_else(|| {
        SonarError::invalid_response(format!(
            "unknown quality gate status '{}'",
            project_status.status
        ))
    })?;

    Ok(QualityGateReport {
        status,
        failed_conditions: project_status
            .conditions
            .into_iter()
            .filter(GateCondition::is_failed)
            .collect(),
    })
}

#[async_trait]
impl AnalysisService for SonarQubeClient {
    async fn submit_task(&self) -> Result<TaskId, SonarError> {
        let content = tokio::fs::read_to_string(&self.report_task_path)
            .await
            .map_err(|_| SonarError::MissingReportTask(self.report_task_path.clone()))?;

        let task_id = parse_report_task(&content)
            .ok_or_else(|| SonarError::MissingReportTask(self.report_task_path.clone()))?;
        info!(task = %task_id, "Found SonarQube analysis task");
        Ok(TaskId(task_id))
    }

    async fn poll_task_status(&self, task_id: &TaskId) -> Result<TaskStatus, SonarError> {
        let response: CeTaskResponse = self
            .get_json(&format!("/api/ce/task?id={}", task_id))
            .await?;
        task_status(response)
    }

    async fn fetch_analysis_details(
        &self,
        analysis_id: &str,
    ) -> Result<QualityGateReport, SonarError> {
        let response: ProjectStatusResponse = self
            .get_json(&format!(
                "/api/qualitygates/project_status?analysisId={}",
                analysis_id
            ))
            .await?;
        quality_gate(response)
    }
}
