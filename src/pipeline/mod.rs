//! Run orchestration
//!
//! `ToolCheck -> PrimaryBuild -> OptionalAnalysis -> ResultCollection ->
//! SummaryPublish -> TestResults`

pub mod context;
pub mod orchestrator;
pub mod report;
pub mod stage;
pub mod stages;

pub use context::RunContext;
pub use orchestrator::RunOrchestrator;
pub use report::{RunReport, Stage, StageOutcome, TaskResult};
pub use stage::RunStage;
