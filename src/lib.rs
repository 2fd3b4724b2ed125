//! buildgate - build step for Maven and Gradle projects in CI pipelines
//!
//! Runs the primary build, an optional SonarQube analysis and collects the
//! PMD and Checkstyle reports of every module the build produced. The
//! results are summarized, staged as artifacts and reported to the pipeline
//! together with a pass/fail result.
//!
//! # Core Concepts
//!
//! - **Stages**: the run is a fixed sequence of [`pipeline::RunStage`]s that
//!   share a [`pipeline::RunContext`]
//! - **Runner**: the external build tool sits behind [`runner::BuildToolRunner`]
//! - **Sink**: everything the pipeline should see goes through
//!   [`sink::ArtifactSink`]
//!
//! # Example Usage
//!
//! ```ignore
//! use buildgate::{PipelineCommandSink, ProcessRunner, RunContext, RunOrchestrator, TaskConfig};
//! use std::sync::Arc;
//!
//! async fn build() -> anyhow::Result<()> {
//!     let config = TaskConfig::from_env()?;
//!     config.validate()?;
//!
//!     let mut context = RunContext::new(
//!         Arc::new(config),
//!         Arc::new(ProcessRunner::new()),
//!         Arc::new(PipelineCommandSink::stdout()),
//!     );
//!
//!     let result = RunOrchestrator::new(None).execute(&mut context).await;
//!     println!("Build {}", result);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod build_tool;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod sink;
pub mod sonar;
pub mod util;

pub use analysis::{AnalysisResult, AnalysisTool, ModuleDescriptor, ResultAggregator};
pub use build_tool::BuildTool;
pub use config::{ConfigError, SonarConfig, TaskConfig};
pub use pipeline::{RunContext, RunOrchestrator, RunReport, Stage, StageOutcome, TaskResult};
pub use runner::{BuildToolRunner, ProcessRunner};
pub use sink::{ArtifactSink, PipelineCommandSink, RecordingSink};
pub use sonar::{AnalysisService, QualityGateReport, QualityGateStatus, SonarQubeClient};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
