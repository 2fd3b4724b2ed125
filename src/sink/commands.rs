use super::{ArtifactSink, SinkError};
use crate::pipeline::TaskResult;
use crate::runner::BuildIssue;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Sink speaking the agent's `##vso[area.action key=value;]data` logging
/// command protocol on a writer (stdout in production)
pub struct PipelineCommandSink<W: Write + Send> {
    out: Mutex<W>,
}

impl PipelineCommandSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PipelineCommandSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn command(&self, name: &str, properties: &[(&str, String)], data: &str) -> Result<(), SinkError> {
        let properties: String = properties
            .iter()
            .map(|(key, value)| format!("{}={};", key, escape_property(value)))
            .collect();
        let line = format!("##vso[{} {}]{}", name, properties, escape_data(data));
        debug!(command = %line, "Emitting pipeline command");

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%AZP25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(']', "%5D").replace(';', "%3B")
}

fn require_path(path: &Path) -> Result<(), SinkError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SinkError::MissingPath(path.to_path_buf()))
    }
}

impl<W: Write + Send> ArtifactSink for PipelineCommandSink<W> {
    fn upload_artifact(
        &self,
        container: &str,
        artifact_name: &str,
        directory: &Path,
    ) -> Result<(), SinkError> {
        require_path(directory)?;
        self.command(
            "artifact.upload",
            &[
                ("containerfolder", container.to_string()),
                ("artifactname", artifact_name.to_string()),
            ],
            &directory.display().to_string(),
        )
    }

    fn add_attachment(
        &self,
        attachment_type: &str,
        name: &str,
        path: &Path,
    ) -> Result<(), SinkError> {
        require_path(path)?;
        self.command(
            "task.addattachment",
            &[
                ("type", attachment_type.to_string()),
                ("name", name.to_string()),
            ],
            &path.display().to_string(),
        )
    }

    fn report_issue(&self, issue: &BuildIssue) -> Result<(), SinkError> {
        self.command(
            "task.issue",
            &[
                ("type", issue.severity.as_str().to_string()),
                ("sourcepath", issue.source_path.clone()),
                ("linenumber", issue.line.to_string()),
                ("columnnumber", issue.column.to_string()),
            ],
            &issue.message,
        )
    }

    fn publish_test_results(&self, files: &[PathBuf]) -> Result<(), SinkError> {
        let files = files
            .iter()
            .map(|f| f.display().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.command(
            "results.publish",
            &[
                ("type", "JUnit".to_string()),
                ("mergeResults", "true".to_string()),
                ("resultFiles", files),
            ],
            "",
        )
    }

    fn set_result(&self, result: TaskResult, message: &str) -> Result<(), SinkError> {
        self.command(
            "task.complete",
            &[("result", result.as_str().to_string())],
            message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::IssueSeverity;
    use tempfile::TempDir;

    fn output(sink: PipelineCommandSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_upload_artifact() {
        let dir = TempDir::new().unwrap();
        let sink = PipelineCommandSink::new(Vec::new());

        sink.upload_artifact("util", "42_util_pmd", dir.path()).unwrap();

        assert_eq!(
            output(sink),
            format!(
                "##vso[artifact.upload containerfolder=util;artifactname=42_util_pmd;]{}\n",
                dir.path().display()
            )
        );
    }

    #[test]
    fn test_missing_attachment_is_error() {
        let sink = PipelineCommandSink::new(Vec::new());

        let result = sink.add_attachment("t", "n", Path::new("/does/not/exist.md"));

        assert!(matches!(result, Err(SinkError::MissingPath(_))));
        assert!(output(sink).is_empty());
    }

    #[test]
    fn test_issue_properties_are_escaped() {
        let sink = PipelineCommandSink::new(Vec::new());
        let issue = BuildIssue {
            severity: IssueSeverity::Error,
            source_path: "src/a;b.java".to_string(),
            line: 4,
            column: 2,
            message: "line one\nline two".to_string(),
        };

        sink.report_issue(&issue).unwrap();

        assert_eq!(
            output(sink),
            "##vso[task.issue type=error;sourcepath=src/a%3Bb.java;linenumber=4;columnnumber=2;]line one%0Aline two\n"
        );
    }

    #[test]
    fn test_set_result() {
        let sink = PipelineCommandSink::new(Vec::new());

        sink.set_result(TaskResult::Failed, "Build failed").unwrap();

        assert_eq!(output(sink), "##vso[task.complete result=Failed;]Build failed\n");
    }
}
