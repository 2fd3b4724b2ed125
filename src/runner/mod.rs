//! Build tool runner
//!
//! Launches the external build tool, streams its stdout back line by line
//! and reports the exit code. Everything above this module only sees the
//! [`BuildToolRunner`] trait, so tests can script tool behavior.

pub mod command;
pub mod issues;
pub mod process;

pub use command::CommandBuilder;
pub use issues::{extract_issues, BuildIssue, IssueSeverity};
pub use process::ProcessRunner;

use crate::build_tool::BuildTool;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Callback receiving each stdout line as it is produced
pub type LineCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Build tool not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to start {program}: {source}")]
    Spawn { program: PathBuf, source: io::Error },

    #[error("Failed while running {program}: {source}")]
    Io { program: PathBuf, source: io::Error },

    #[error("{program} was terminated by a signal")]
    Terminated { program: PathBuf },
}

#[async_trait]
pub trait BuildToolRunner: Send + Sync {
    /// Resolves the executable to run for `build_tool`
    fn locate(&self, build_tool: BuildTool, tool_path: Option<&Path>)
        -> Result<PathBuf, RunnerError>;

    /// Runs `invocation` to completion and returns its exit code
    async fn run(
        &self,
        invocation: &ToolInvocation,
        on_line: Option<LineCallback<'_>>,
    ) -> Result<i32, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = ToolInvocation::new("/usr/local/bin/mvn", "/src")
            .args(["-f", "pom.xml"])
            .arg("package");

        assert_eq!(invocation.args, vec!["-f", "pom.xml", "package"]);
        assert_eq!(invocation.command_line(), "/usr/local/bin/mvn -f pom.xml package");
    }
}
