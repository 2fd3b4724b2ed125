use std::fmt;

/// Final verdict handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    Succeeded,
    Failed,
}

impl TaskResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ToolCheck,
    PrimaryBuild,
    OptionalAnalysis,
    ResultCollection,
    SummaryPublish,
    TestResults,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToolCheck => "ToolCheck",
            Self::PrimaryBuild => "PrimaryBuild",
            Self::OptionalAnalysis => "OptionalAnalysis",
            Self::ResultCollection => "ResultCollection",
            Self::SummaryPublish => "SummaryPublish",
            Self::TestResults => "TestResults",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// Failure flags and per-stage outcomes of one run.
///
/// A failed stage raises its flag and the run moves on; only the flags decide
/// the final [`TaskResult`].
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tool_check_failed: bool,
    pub build_failed: bool,
    pub analysis_failed: bool,
    pub collection_failed: bool,
    stages: Vec<(Stage, StageOutcome)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        if outcome == StageOutcome::Failed {
            match stage {
                Stage::ToolCheck => self.tool_check_failed = true,
                Stage::PrimaryBuild => self.build_failed = true,
                Stage::OptionalAnalysis => self.analysis_failed = true,
                // A summary that cannot be published is a result-processing failure
                Stage::ResultCollection | Stage::SummaryPublish => self.collection_failed = true,
                // Test results are informational
                Stage::TestResults => {}
            }
        }
        self.stages.push((stage, outcome));
    }

    /// Outcome of `stage`; `None` if it was never reached
    pub fn outcome(&self, stage: Stage) -> Option<StageOutcome> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, outcome)| *outcome)
    }

    pub fn stages(&self) -> &[(Stage, StageOutcome)] {
        &self.stages
    }

    pub fn result(&self) -> TaskResult {
        if self.tool_check_failed
            || self.build_failed
            || self.analysis_failed
            || self.collection_failed
        {
            TaskResult::Failed
        } else {
            TaskResult::Succeeded
        }
    }

    /// Human-readable reason for a failed result; empty on success
    pub fn failure_message(&self) -> String {
        let reasons: Vec<&str> = [
            (self.tool_check_failed, "build tool unavailable"),
            (self.build_failed, "build failed"),
            (self.analysis_failed, "SonarQube analysis failed"),
            (self.collection_failed, "code analysis results could not be processed"),
        ]
        .iter()
        .filter(|(failed, _)| *failed)
        .map(|(_, reason)| *reason)
        .collect();
        reasons.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_clear_succeeds() {
        let mut report = RunReport::new();
        report.record(Stage::ToolCheck, StageOutcome::Succeeded);
        report.record(Stage::PrimaryBuild, StageOutcome::Succeeded);
        report.record(Stage::OptionalAnalysis, StageOutcome::Skipped);

        assert_eq!(report.result(), TaskResult::Succeeded);
        assert!(report.failure_message().is_empty());
    }

    #[test]
    fn test_any_flag_fails() {
        for stage in [
            Stage::ToolCheck,
            Stage::PrimaryBuild,
            Stage::OptionalAnalysis,
            Stage::ResultCollection,
            Stage::SummaryPublish,
        ] {
            let mut report = RunReport::new();
            report.record(stage, StageOutcome::Failed);
            assert_eq!(report.result(), TaskResult::Failed, "{}", stage);
        }
    }

    #[test]
    fn test_test_results_failure_does_not_fail_run() {
        let mut report = RunReport::new();
        report.record(Stage::TestResults, StageOutcome::Failed);

        assert_eq!(report.result(), TaskResult::Succeeded);
        assert_eq!(report.outcome(Stage::TestResults), Some(StageOutcome::Failed));
    }

    #[test]
    fn test_failure_message_lists_reasons() {
        let mut report = RunReport::new();
        report.record(Stage::PrimaryBuild, StageOutcome::Failed);
        report.record(Stage::SummaryPublish, StageOutcome::Failed);

        assert_eq!(
            report.failure_message(),
            "build failed; code analysis results could not be processed"
        );
        assert_eq!(report.outcome(Stage::ResultCollection), None);
    }
}
