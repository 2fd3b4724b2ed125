use super::{issue_reporter, tool_program};
use crate::pipeline::context::RunContext;
use crate::pipeline::report::Stage;
use crate::pipeline::stage::RunStage;
use crate::runner::CommandBuilder;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;

/// Runs the configured goals plus the report goals of every enabled tool
pub struct PrimaryBuildStage;

#[async_trait]
impl RunStage for PrimaryBuildStage {
    fn stage(&self) -> Stage {
        Stage::PrimaryBuild
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let program = tool_program(&context.tool_program)?;
        let invocation = CommandBuilder::new(&context.config, &program).primary_build();
        let on_line = issue_reporter(context.sink.clone());

        let code = context
            .runner
            .run(&invocation, Some(&on_line))
            .await
            .context("Build could not be run")?;
        if code != 0 {
            bail!("Build failed with exit code {}", code);
        }
        Ok(())
    }
}
