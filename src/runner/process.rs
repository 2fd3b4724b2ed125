use super::{BuildToolRunner, LineCallback, RunnerError, ToolInvocation};
use crate::build_tool::BuildTool;
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Runs build tools as child processes.
///
/// Stdout is read line by line and echoed to this process's stdout so the
/// pipeline log shows the build as it happens; stderr is inherited.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    echo: bool,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self { echo: true }
    }

    /// Runner that hands lines to the callback without echoing them
    pub fn quiet() -> Self {
        Self { echo: false }
    }
}

#[async_trait]
impl BuildToolRunner for ProcessRunner {
    /// An explicit path must point at an existing file; otherwise the tool's
    /// executable name is looked up on `PATH`.
    fn locate(
        &self,
        build_tool: BuildTool,
        tool_path: Option<&Path>,
    ) -> Result<PathBuf, RunnerError> {
        if let Some(path) = tool_path {
            return if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(RunnerError::NotFound(path.to_path_buf()))
            };
        }

        which::which(build_tool.executable())
            .map_err(|_| RunnerError::NotFound(PathBuf::from(build_tool.executable())))
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        on_line: Option<LineCallback<'_>>,
    ) -> Result<i32, RunnerError> {
        let program = invocation.program.clone();
        info!(command = %invocation.command_line(), "Running build tool");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => RunnerError::NotFound(program.clone()),
                _ => RunnerError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .await
                    .map_err(|source| RunnerError::Io {
                        program: program.clone(),
                        source,
                    })?;
                if read == 0 {
                    break;
                }

                // Build tools print in the agent's code page; bad bytes are replaced
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                if self.echo {
                    let mut out = io::stdout().lock();
                    // A closed stdout must not abort the build
                    let _ = writeln!(out, "{}", line);
                }
                if let Some(callback) = on_line {
                    callback(line);
                }
            }
        }

        let status = child.wait().await.map_err(|source| RunnerError::Io {
            program: program.clone(),
            source,
        })?;

        let code = status
            .code()
            .ok_or_else(|| RunnerError::Terminated { program: program.clone() })?;
        debug!(program = %program.display(), code, "Build tool exited");
        Ok(code)
    }
}
