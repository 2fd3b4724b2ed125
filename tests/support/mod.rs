//! Shared fixtures for the integration tests: a scripted build tool runner
//! and helpers that lay out built Maven modules in a temp directory.

#![allow(dead_code)]

use async_trait::async_trait;
use buildgate::analysis::AnalysisTool;
use buildgate::build_tool::BuildTool;
use buildgate::config::TaskConfig;
use buildgate::runner::{BuildToolRunner, LineCallback, RunnerError, ToolInvocation};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub const PMD_TWO_FILES: &str = include_str!("../fixtures/reports/pmd-two-files.xml");
pub const PMD_ONE_FILE: &str = include_str!("../fixtures/reports/pmd-one-file.xml");
pub const PMD_NO_FILES: &str = include_str!("../fixtures/reports/pmd-no-files.xml");
pub const CHECKSTYLE_RESULT: &str = include_str!("../fixtures/reports/checkstyle-result.xml");

/// What one scripted tool invocation does
#[derive(Debug, Clone, Default)]
pub struct ScriptedRun {
    pub exit_code: i32,
    pub lines: Vec<String>,
    /// Files written (absolute path, content) before the run returns
    pub writes: Vec<(PathBuf, String)>,
}

impl ScriptedRun {
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Default::default()
        }
    }

    pub fn with_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn with_write(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.writes.push((path.into(), content.to_string()));
        self
    }
}

/// Runner that replays scripted invocations in order; unscripted runs exit 0
pub struct FakeRunner {
    available: bool,
    script: Mutex<VecDeque<ScriptedRun>>,
    invocations: Mutex<Vec<ToolInvocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            available: true,
            script: Mutex::new(VecDeque::new()),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn missing_tool() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn then(self, run: ScriptedRun) -> Self {
        self.script.lock().unwrap().push_back(run);
        self
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildToolRunner for FakeRunner {
    fn locate(
        &self,
        build_tool: BuildTool,
        tool_path: Option<&Path>,
    ) -> Result<PathBuf, RunnerError> {
        let program = tool_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(build_tool.executable()));
        if self.available {
            Ok(program)
        } else {
            Err(RunnerError::NotFound(program))
        }
    }

    async fn run(
        &self,
        invocation: &ToolInvocation,
        on_line: Option<LineCallback<'_>>,
    ) -> Result<i32, RunnerError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let run = self.script.lock().unwrap().pop_front().unwrap_or_default();

        for (path, content) in &run.writes {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        if let Some(on_line) = on_line {
            for line in &run.lines {
                on_line(line);
            }
        }
        Ok(run.exit_code)
    }
}

/// Temp workspace with a `s/` sources tree and an `a/` staging directory
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(workspace.sources()).unwrap();
        fs::create_dir_all(workspace.staging()).unwrap();
        workspace
    }

    pub fn sources(&self) -> PathBuf {
        self.temp_dir.path().join("s")
    }

    pub fn staging(&self) -> PathBuf {
        self.temp_dir.path().join("a")
    }

    /// A Maven module under `relative` with a pom and an empty target directory
    pub fn maven_module(&self, relative: &str) -> PathBuf {
        let dir = self.sources().join(relative);
        fs::create_dir_all(dir.join("target")).unwrap();
        fs::write(dir.join("pom.xml"), "<project/>").unwrap();
        dir
    }

    pub fn config(&self, tools: Vec<AnalysisTool>) -> TaskConfig {
        TaskConfig {
            sources_dir: self.sources(),
            staging_dir: self.staging(),
            run_id: "42".to_string(),
            analysis_tools: tools,
            publish_junit: false,
            ..TaskConfig::default()
        }
    }
}
