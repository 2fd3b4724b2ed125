use super::{AnalysisService, QualityGateReport, SonarError, TaskId, TaskStatus};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Progress of one compute-engine task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    Pending,
    Succeeded(String),
    Failed(String),
    TimedOut,
}

/// Polls an analysis task on a fixed interval until it reaches a terminal
/// state or the deadline passes, then fetches the quality gate
pub struct QualityGateWatcher<'a> {
    service: &'a dyn AnalysisService,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> QualityGateWatcher<'a> {
    pub fn new(service: &'a dyn AnalysisService, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            service,
            poll_interval,
            timeout,
        }
    }

    /// Submits, waits, and returns the gate verdict
    pub async fn watch(&self) -> Result<QualityGateReport, SonarError> {
        let task_id = self.service.submit_task().await?;
        let analysis_id = self.wait_for_analysis(&task_id).await?;
        let report = self.service.fetch_analysis_details(&analysis_id).await?;
        info!(analysis = %analysis_id, status = ?report.status, "Quality gate computed");
        Ok(report)
    }

    pub async fn wait_for_analysis(&self, task_id: &TaskId) -> Result<String, SonarError> {
        let deadline = Instant::now() + self.timeout;
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = WatchState::Pending;
        loop {
            match state {
                WatchState::Pending => {}
                WatchState::Succeeded(analysis_id) => return Ok(analysis_id),
                WatchState::Failed(status) => {
                    return Err(SonarError::TaskFailed {
                        task_id: task_id.to_string(),
                        status,
                    })
                }
                WatchState::TimedOut => {
                    warn!(task = %task_id, "Gave up waiting for analysis task");
                    return Err(SonarError::Timeout {
                        seconds: self.timeout.as_secs(),
                    });
                }
            }

            state = tokio::select! {
                biased;
                _ = time::sleep_until(deadline) => WatchState::TimedOut,
                status = async {
                    interval.tick().await;
                    self.service.poll_task_status(task_id).await
                } => match status? {
                    TaskStatus::Pending => {
                        debug!(task = %task_id, "Analysis task still pending");
                        WatchState::Pending
                    }
                    TaskStatus::Success { analysis_id } => WatchState::Succeeded(analysis_id),
                    TaskStatus::Error { status } => WatchState::Failed(status),
                },
            };
        }
    }
}
