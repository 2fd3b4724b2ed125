use super::{
    AnalysisService, GateCondition, QualityGateReport, QualityGateStatus, SonarError, TaskId,
    TaskStatus,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted analysis service.
///
/// Task statuses are handed out in order; once the script runs out every
/// poll reports `Pending`.
pub struct MockAnalysisService {
    task: Result<TaskId, SonarError>,
    statuses: Mutex<VecDeque<Result<TaskStatus, SonarError>>>,
    gate: Result<QualityGateReport, SonarError>,
    polls: AtomicUsize,
}

impl MockAnalysisService {
    pub fn new(gate: QualityGateStatus) -> Self {
        Self {
            task: Ok(TaskId("task-1".to_string())),
            statuses: Mutex::new(VecDeque::new()),
            gate: Ok(QualityGateReport::new(gate)),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn with_task_error(mut self, error: SonarError) -> Self {
        self.task = Err(error);
        self
    }

    pub fn with_failed_conditions(mut self, conditions: Vec<GateCondition>) -> Self {
        if let Ok(report) = &mut self.gate {
            report.failed_conditions = conditions;
        }
        self
    }

    pub fn with_gate_error(mut self, error: SonarError) -> Self {
        self.gate = Err(error);
        self
    }

    pub fn add_status(&self, status: Result<TaskStatus, SonarError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn add_statuses(&self, statuses: impl IntoIterator<Item = TaskStatus>) {
        let mut queue = self.statuses.lock().unwrap();
        for status in statuses {
            queue.push_back(Ok(status));
        }
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn submit_task(&self) -> Result<TaskId, SonarError> {
        self.task.clone()
    }

    async fn poll_task_status(&self, _task_id: &TaskId) -> Result<TaskStatus, SonarError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TaskStatus::Pending))
    }

    async fn fetch_analysis_details(
        &self,
        _analysis_id: &str,
    ) -> Result<QualityGateReport, SonarError> {
        self.gate.clone()
    }
}
