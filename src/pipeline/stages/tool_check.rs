use crate::pipeline::context::RunContext;
use crate::pipeline::report::Stage;
use crate::pipeline::stage::RunStage;
use crate::runner::CommandBuilder;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

/// Resolves the build tool and checks that it starts
pub struct ToolCheckStage;

#[async_trait]
impl RunStage for ToolCheckStage {
    fn stage(&self) -> Stage {
        Stage::ToolCheck
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let config = context.config.clone();
        let program = context
            .runner
            .locate(config.build_tool, config.tool_path.as_deref())
            .with_context(|| format!("{} is not installed", config.build_tool))?;
        info!(tool = %config.build_tool, program = %program.display(), "Found build tool");

        let probe = CommandBuilder::new(&config, &program).version_probe();
        let code = context
            .runner
            .run(&probe, None)
            .await
            .with_context(|| format!("Failed to run {}", program.display()))?;
        if code != 0 {
            bail!("{} version check exited with code {}", config.build_tool, code);
        }

        context.tool_program = Some(program);
        Ok(())
    }
}
