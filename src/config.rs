//! Task configuration
//!
//! [`TaskConfig`] is built once at startup, from the pipeline's environment
//! and the command line, and then passed by reference to everything that
//! needs it. No other module reads the environment.
//!
//! # Environment Variables
//!
//! ## Pipeline variables
//! - `BUILD_SOURCESDIRECTORY`: checkout root - default: current directory
//! - `BUILD_ARTIFACTSTAGINGDIRECTORY`: scratch area for uploads - default: system temp dir + "buildgate"
//! - `BUILD_BUILDNUMBER`: run identifier used in artifact names - default: random UUID
//!
//! ## Task inputs
//! - `BUILDGATE_BUILD_TOOL`: maven|gradle - default: "maven"
//! - `BUILDGATE_TOOL_PATH`: explicit path to the build tool executable
//! - `BUILDGATE_PROJECT_FILE`: pom.xml / build.gradle, relative to the sources directory
//! - `BUILDGATE_GOALS`: goals or tasks of the primary build - default: "package"
//! - `BUILDGATE_OPTIONS`: extra arguments placed before the goals
//! - `BUILDGATE_PMD_ENABLED`, `BUILDGATE_CHECKSTYLE_ENABLED`: run and collect the tool - default: "false"
//! - `BUILDGATE_SONAR_ENABLED`: run a SonarQube analysis - default: "false"
//! - `BUILDGATE_SONAR_HOST_URL`, `BUILDGATE_SONAR_USERNAME`, `BUILDGATE_SONAR_PASSWORD`
//! - `BUILDGATE_SONAR_DB_URL`, `BUILDGATE_SONAR_DB_USERNAME`, `BUILDGATE_SONAR_DB_PASSWORD`:
//!   only needed by SonarQube servers older than 5.2
//! - `BUILDGATE_SONAR_WAIT_FOR_GATE`: fail the task on a failed quality gate - default: "false"
//! - `BUILDGATE_SONAR_POLL_INTERVAL_SECS` - default: "1"
//! - `BUILDGATE_SONAR_TIMEOUT_SECS` - default: "300"
//! - `BUILDGATE_PUBLISH_JUNIT`: publish test results - default: "true"
//! - `BUILDGATE_TEST_RESULTS`: JUnit file glob - default: "**/TEST-*.xml"
//! - `BUILDGATE_LOG_LEVEL`: trace|debug|info|warn|error - default: "info"

use crate::analysis::AnalysisTool;
use crate::build_tool::BuildTool;
use crate::runner::command::split_arguments;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_GOALS: &str = "package";
const DEFAULT_TEST_RESULTS: &str = "**/TEST-*.xml";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Directory under the artifact staging directory holding analysis output
pub const STAGING_SUBDIR: &str = ".codeanalysis";

/// File name of the markdown build summary
pub const SUMMARY_FILE_NAME: &str = "CodeAnalysisBuildSummary.md";

const MASK: &str = "********";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid build tool: {0}. Valid options: maven, gradle")]
    InvalidBuildTool(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Connection and polling settings for the SonarQube analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SonarConfig {
    pub host_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db_url: Option<String>,
    pub db_username: Option<String>,
    pub db_password: Option<String>,
    pub wait_for_quality_gate: bool,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl SonarConfig {
    pub fn new(host_url: impl Into<String>) -> Self {
        Self {
            host_url: host_url.into(),
            username: None,
            password: None,
            db_url: None,
            db_username: None,
            db_password: None,
            wait_for_quality_gate: false,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub sources_dir: PathBuf,
    pub staging_dir: PathBuf,

    /// Identifies this run in artifact names
    pub run_id: String,

    pub build_tool: BuildTool,
    pub tool_path: Option<PathBuf>,
    pub project_file: PathBuf,
    pub goals: Vec<String>,
    pub options: Vec<String>,

    /// Enabled tools, in the order their summary lines are written
    pub analysis_tools: Vec<AnalysisTool>,

    /// `None` when SonarQube analysis is disabled
    pub sonar: Option<SonarConfig>,

    pub publish_junit: bool,
    pub test_results_glob: String,
    pub log_level: String,
}

impl Default for TaskConfig {
    /// Built-in defaults only; see [`TaskConfig::from_env`]
    fn default() -> Self {
        let build_tool = BuildTool::Maven;
        Self {
            sources_dir: PathBuf::from("."),
            staging_dir: env::temp_dir().join("buildgate"),
            run_id: Uuid::new_v4().to_string(),
            build_tool,
            tool_path: None,
            project_file: PathBuf::from(build_tool.default_project_file()),
            goals: vec![DEFAULT_GOALS.to_string()],
            options: Vec::new(),
            analysis_tools: Vec::new(),
            sonar: None,
            publish_junit: true,
            test_results_glob: DEFAULT_TEST_RESULTS.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn bool_var(key: &str, default: bool) -> Result<bool, ConfigError> {
    match var(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .to_lowercase()
            .parse::<bool>()
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: format!("'{}': {}", value, e),
            }),
    }
}

fn secs_var(key: &str, default: u64) -> Result<Duration, ConfigError> {
    match var(key) {
        None => Ok(Duration::from_secs(default)),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::ParseError {
                field: key.to_string(),
                error: format!("'{}': {}", value, e),
            }),
    }
}

impl TaskConfig {
    /// Loads pipeline variables and `BUILDGATE_*` inputs, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let build_tool = match var("BUILDGATE_BUILD_TOOL") {
            Some(name) => BuildTool::from_name(&name.trim().to_lowercase())
                .ok_or(ConfigError::InvalidBuildTool(name))?,
            None => defaults.build_tool,
        };

        let mut analysis_tools = Vec::new();
        if bool_var("BUILDGATE_PMD_ENABLED", false)? {
            analysis_tools.push(AnalysisTool::Pmd);
        }
        if bool_var("BUILDGATE_CHECKSTYLE_ENABLED", false)? {
            analysis_tools.push(AnalysisTool::Checkstyle);
        }

        let sonar = if bool_var("BUILDGATE_SONAR_ENABLED", false)? {
            Some(SonarConfig {
                host_url: var("BUILDGATE_SONAR_HOST_URL").unwrap_or_default(),
                username: var("BUILDGATE_SONAR_USERNAME"),
                password: var("BUILDGATE_SONAR_PASSWORD"),
                db_url: var("BUILDGATE_SONAR_DB_URL"),
                db_username: var("BUILDGATE_SONAR_DB_USERNAME"),
                db_password: var("BUILDGATE_SONAR_DB_PASSWORD"),
                wait_for_quality_gate: bool_var("BUILDGATE_SONAR_WAIT_FOR_GATE", false)?,
                poll_interval: secs_var(
                    "BUILDGATE_SONAR_POLL_INTERVAL_SECS",
                    DEFAULT_POLL_INTERVAL_SECS,
                )?,
                timeout: secs_var("BUILDGATE_SONAR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            })
        } else {
            None
        };

        Ok(Self {
            sources_dir: var("BUILD_SOURCESDIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.sources_dir),
            staging_dir: var("BUILD_ARTIFACTSTAGINGDIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            run_id: var("BUILD_BUILDNUMBER").unwrap_or(defaults.run_id),
            build_tool,
            tool_path: var("BUILDGATE_TOOL_PATH").map(PathBuf::from),
            project_file: var("BUILDGATE_PROJECT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(build_tool.default_project_file())),
            goals: var("BUILDGATE_GOALS")
                .map(|g| split_arguments(&g))
                .unwrap_or(defaults.goals),
            options: var("BUILDGATE_OPTIONS")
                .map(|o| split_arguments(&o))
                .unwrap_or_default(),
            analysis_tools,
            sonar,
            publish_junit: bool_var("BUILDGATE_PUBLISH_JUNIT", defaults.publish_junit)?,
            test_results_glob: var("BUILDGATE_TEST_RESULTS").unwrap_or(defaults.test_results_glob),
            log_level: var("BUILDGATE_LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.goals.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one goal or task is required".to_string(),
            ));
        }

        if let Some(sonar) = &self.sonar {
            if sonar.host_url.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "SonarQube analysis is enabled but no host URL is set".to_string(),
                ));
            }
            if sonar.poll_interval.is_zero() {
                return Err(ConfigError::ValidationFailed(
                    "SonarQube poll interval must be at least 1 second".to_string(),
                ));
            }
            if sonar.poll_interval > sonar.timeout {
                return Err(ConfigError::ValidationFailed(format!(
                    "SonarQube poll interval ({}s) exceeds the timeout ({}s)",
                    sonar.poll_interval.as_secs(),
                    sonar.timeout.as_secs()
                )));
            }
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Project file resolved against the sources directory
    pub fn project_file_path(&self) -> PathBuf {
        if self.project_file.is_absolute() {
            self.project_file.clone()
        } else {
            self.sources_dir.join(&self.project_file)
        }
    }

    /// Root of the per-tool, per-module staging layout
    pub fn staging_root(&self) -> PathBuf {
        self.staging_dir.join(STAGING_SUBDIR)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.staging_root().join(SUMMARY_FILE_NAME)
    }

    pub fn sonar_report_task_path(&self) -> PathBuf {
        self.sources_dir.join(self.build_tool.sonar_report_task())
    }

    pub fn has_analysis_tools(&self) -> bool {
        !self.analysis_tools.is_empty()
    }
}

fn masked(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => MASK,
        _ => "(not set)",
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

impl fmt::Display for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buildgate Configuration:")?;
        writeln!(f, "  Sources Dir: {}", display_path(&self.sources_dir))?;
        writeln!(f, "  Staging Dir: {}", display_path(&self.staging_dir))?;
        writeln!(f, "  Run Id: {}", self.run_id)?;
        writeln!(f, "  Build Tool: {}", self.build_tool)?;
        if let Some(ref path) = self.tool_path {
            writeln!(f, "  Tool Path: {}", display_path(path))?;
        }
        writeln!(f, "  Project File: {}", display_path(&self.project_file))?;
        writeln!(f, "  Goals: {}", self.goals.join(" "))?;
        writeln!(f, "  Options: {}", self.options.join(" "))?;
        let tools: Vec<&str> = self.analysis_tools.iter().map(|t| t.name()).collect();
        writeln!(f, "  Analysis Tools: {}", tools.join(", "))?;
        match &self.sonar {
            Some(sonar) => {
                writeln!(f, "  SonarQube: {}", sonar.host_url)?;
                writeln!(f, "    Username: {}", masked(&sonar.username))?;
                writeln!(f, "    Password: {}", masked(&sonar.password))?;
                if let Some(ref db_url) = sonar.db_url {
                    writeln!(f, "    Database: {}", db_url)?;
                    writeln!(f, "    Database Username: {}", masked(&sonar.db_username))?;
                    writeln!(f, "    Database Password: {}", masked(&sonar.db_password))?;
                }
                writeln!(f, "    Wait For Quality Gate: {}", sonar.wait_for_quality_gate)?;
                writeln!(
                    f,
                    "    Poll: every {}s, up to {}s",
                    sonar.poll_interval.as_secs(),
                    sonar.timeout.as_secs()
                )?;
            }
            None => writeln!(f, "  SonarQube: disabled")?,
        }
        writeln!(f, "  Publish JUnit: {}", self.publish_junit)?;
        writeln!(f, "  Test Results: {}", self.test_results_glob)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
