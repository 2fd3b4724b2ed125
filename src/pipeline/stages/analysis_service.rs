use super::{issue_reporter, tool_program};
use crate::build_tool::BuildTool;
use crate::pipeline::context::RunContext;
use crate::pipeline::report::Stage;
use crate::pipeline::stage::RunStage;
use crate::runner::command::write_gradle_init_script;
use crate::runner::CommandBuilder;
use crate::sonar::QualityGateWatcher;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tracing::{error, info};

/// SonarQube scanner run, followed by the quality gate when configured
pub struct OptionalAnalysisStage;

#[async_trait]
impl RunStage for OptionalAnalysisStage {
    fn stage(&self) -> Stage {
        Stage::OptionalAnalysis
    }

    fn skip_reason(&self, context: &RunContext) -> Option<String> {
        context
            .config
            .sonar
            .is_none()
            .then(|| "SonarQube analysis disabled".to_string())
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let config = context.config.clone();
        let sonar = config
            .sonar
            .as_ref()
            .ok_or_else(|| anyhow!("SonarQube analysis is not configured"))?;
        let program = tool_program(&context.tool_program)?;

        if config.build_tool == BuildTool::Gradle {
            let script = write_gradle_init_script(&config.sources_dir)
                .context("Failed to write the SonarQube init script")?;
            info!(path = %script.display(), "Wrote SonarQube init script");
        }

        let invocation = CommandBuilder::new(&config, &program).sonar_analysis(sonar);
        let on_line = issue_reporter(context.sink.clone());
        let code = context
            .runner
            .run(&invocation, Some(&on_line))
            .await
            .context("SonarQube analysis could not be run")?;
        if code != 0 {
            bail!("SonarQube analysis failed with exit code {}", code);
        }

        if !sonar.wait_for_quality_gate {
            return Ok(());
        }

        let service = context
            .analysis_service
            .clone()
            .ok_or_else(|| anyhow!("No analysis service available to check the quality gate"))?;
        let report = QualityGateWatcher::new(service.as_ref(), sonar.poll_interval, sonar.timeout)
            .watch()
            .await
            .context("Quality gate could not be determined")?;

        if report.is_failure() {
            for condition in &report.failed_conditions {
                error!(
                    metric = %condition.metric_key,
                    status = %condition.status,
                    "Quality gate condition failed: {}",
                    condition
                );
            }
            bail!(
                "Quality gate failed ({} failed condition(s))",
                report.failed_conditions.len()
            );
        }
        info!(status = ?report.status, "Quality gate passed");
        Ok(())
    }
}
