use super::context::RunContext;
use super::report::{Stage, StageOutcome, TaskResult};
use super::stage::RunStage;
use super::stages::{
    OptionalAnalysisStage, PrimaryBuildStage, ResultCollectionStage, SummaryPublishStage,
    TestResultsStage, ToolCheckStage,
};
use crate::progress::{ProgressEvent, ProgressHandler};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives a run through its stages.
///
/// Every stage is attempted unless it reports a skip reason; a failed stage
/// raises its flag in the [`RunReport`](super::RunReport) and the run
/// continues. Only a failed tool check ends the run early.
pub struct RunOrchestrator {
    progress_handler: Option<Box<dyn ProgressHandler>>,
}

impl RunOrchestrator {
    pub fn new(progress_handler: Option<Box<dyn ProgressHandler>>) -> Self {
        Self { progress_handler }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    fn stages() -> Vec<Box<dyn RunStage>> {
        vec![
            Box::new(ToolCheckStage),
            Box::new(PrimaryBuildStage),
            Box::new(OptionalAnalysisStage),
            Box::new(ResultCollectionStage),
            Box::new(SummaryPublishStage),
            Box::new(TestResultsStage),
        ]
    }

    /// Runs every stage, reports the result to the sink and returns it
    pub async fn execute(&self, context: &mut RunContext) -> TaskResult {
        let start = Instant::now();
        info!(
            sources = %context.config.sources_dir.display(),
            tool = %context.config.build_tool,
            "Starting build step"
        );
        self.emit(ProgressEvent::Started {
            sources_dir: context.config.sources_dir.display().to_string(),
        });

        for stage in Self::stages() {
            let name = stage.stage();

            if let Some(reason) = stage.skip_reason(context) {
                debug!(stage = %name, reason = %reason, "Stage skipped");
                context.report.record(name, StageOutcome::Skipped);
                self.emit(ProgressEvent::StageSkipped {
                    stage: name,
                    reason,
                });
                continue;
            }

            self.emit(ProgressEvent::StageStarted { stage: name });
            let stage_start = Instant::now();
            let outcome = match stage.execute(context).await {
                Ok(()) => StageOutcome::Succeeded,
                Err(e) => {
                    match name {
                        Stage::TestResults => warn!(stage = %name, "{:#}", e),
                        _ => error!(stage = %name, "{:#}", e),
                    }
                    StageOutcome::Failed
                }
            };
            context.report.record(name, outcome);
            self.emit(ProgressEvent::StageComplete {
                stage: name,
                failed: outcome == StageOutcome::Failed,
                duration: stage_start.elapsed(),
            });

            if name == Stage::ToolCheck && outcome == StageOutcome::Failed {
                error!("Build tool is not available, stopping");
                break;
            }
        }

        let result = context.report.result();
        let message = context.report.failure_message();
        if let Err(e) = context.sink.set_result(result, &message) {
            error!("Failed to report the task result: {}", e);
        }

        info!(result = %result, "Build step finished");
        self.emit(ProgressEvent::Completed {
            result,
            total_time: start.elapsed(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::LoggingHandler;

    #[test]
    fn test_orchestrator_creation() {
        let orchestrator = RunOrchestrator::new(None);
        assert!(orchestrator.progress_handler.is_none());

        let orchestrator = RunOrchestrator::new(Some(Box::new(LoggingHandler)));
        assert!(orchestrator.progress_handler.is_some());
    }

    #[test]
    fn test_stage_order() {
        let order: Vec<Stage> = RunOrchestrator::stages().iter().map(|s| s.stage()).collect();
        assert_eq!(
            order,
            vec![
                Stage::ToolCheck,
                Stage::PrimaryBuild,
                Stage::OptionalAnalysis,
                Stage::ResultCollection,
                Stage::SummaryPublish,
                Stage::TestResults,
            ]
        );
    }
}
