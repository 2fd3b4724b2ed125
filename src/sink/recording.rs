use super::{ArtifactSink, SinkError};
use crate::pipeline::TaskResult;
use crate::runner::BuildIssue;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    ArtifactUploaded {
        container: String,
        artifact_name: String,
        directory: PathBuf,
    },
    AttachmentAdded {
        attachment_type: String,
        name: String,
        path: PathBuf,
    },
    IssueReported(BuildIssue),
    TestResultsPublished(Vec<PathBuf>),
    ResultSet {
        result: TaskResult,
        message: String,
    },
}

/// In-memory sink that records every call, for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<VecDeque<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SinkEvent) -> Result<(), SinkError> {
        self.lock().push_back(event);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<SinkEvent>> {
        match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::ArtifactUploaded {
                    container,
                    artifact_name,
                    ..
                } => Some((container.clone(), artifact_name.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn attachments(&self) -> Vec<PathBuf> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::AttachmentAdded { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn issues(&self) -> Vec<BuildIssue> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::IssueReported(issue) => Some(issue.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last result set on the sink, if any
    pub fn result(&self) -> Option<TaskResult> {
        self.lock().iter().rev().find_map(|event| match event {
            SinkEvent::ResultSet { result, .. } => Some(*result),
            _ => None,
        })
    }
}

impl ArtifactSink for RecordingSink {
    fn upload_artifact(
        &self,
        container: &str,
        artifact_name: &str,
        directory: &Path,
    ) -> Result<(), SinkError> {
        self.push(SinkEvent::ArtifactUploaded {
            container: container.to_string(),
            artifact_name: artifact_name.to_string(),
            directory: directory.to_path_buf(),
        })
    }

    fn add_attachment(
        &self,
        attachment_type: &str,
        name: &str,
        path: &Path,
    ) -> Result<(), SinkError> {
        self.push(SinkEvent::AttachmentAdded {
            attachment_type: attachment_type.to_string(),
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    fn report_issue(&self, issue: &BuildIssue) -> Result<(), SinkError> {
        self.push(SinkEvent::IssueReported(issue.clone()))
    }

    fn publish_test_results(&self, files: &[PathBuf]) -> Result<(), SinkError> {
        self.push(SinkEvent::TestResultsPublished(files.to_vec()))
    }

    fn set_result(&self, result: TaskResult, message: &str) -> Result<(), SinkError> {
        self.push(SinkEvent::ResultSet {
            result,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let sink = RecordingSink::new();

        sink.upload_artifact("root", "1_root_pmd", Path::new("/s/pmd/root"))
            .unwrap();
        sink.set_result(TaskResult::Succeeded, "").unwrap();
        sink.set_result(TaskResult::Failed, "late").unwrap();

        assert_eq!(sink.events().len(), 3);
        assert_eq!(
            sink.uploads(),
            vec![("root".to_string(), "1_root_pmd".to_string())]
        );
        assert_eq!(sink.result(), Some(TaskResult::Failed));
        assert!(sink.attachments().is_empty());
    }
}
