use super::commands::RunArgs;
use crate::config::TaskConfig;
use crate::pipeline::{RunContext, RunOrchestrator, TaskResult};
use crate::progress::LoggingHandler;
use crate::runner::ProcessRunner;
use crate::sink::{ArtifactSink, PipelineCommandSink};
use crate::sonar::SonarQubeClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::error;

/// Environment first, then flags, then validation
pub fn load_config(args: &RunArgs) -> Result<TaskConfig> {
    let mut config = TaskConfig::from_env().context("Failed to read task inputs")?;
    args.apply(&mut config);
    config.validate().context("Invalid task configuration")?;
    Ok(config)
}

pub async fn handle_run(args: &RunArgs) -> i32 {
    let sink: Arc<dyn ArtifactSink> = Arc::new(PipelineCommandSink::stdout());

    let result = match run(args, sink.clone()).await {
        Ok(result) => result,
        Err(e) => {
            error!("{:#}", e);
            if let Err(e) = sink.set_result(TaskResult::Failed, &format!("{:#}", e)) {
                error!("Failed to report the task result: {}", e);
            }
            TaskResult::Failed
        }
    };

    match result {
        TaskResult::Succeeded => 0,
        TaskResult::Failed => 1,
    }
}

async fn run(args: &RunArgs, sink: Arc<dyn ArtifactSink>) -> Result<TaskResult> {
    let config = Arc::new(load_config(args)?);

    let mut context = RunContext::new(config.clone(), Arc::new(ProcessRunner::new()), sink);
    if let Some(sonar) = &config.sonar {
        let client = SonarQubeClient::new(sonar, config.sonar_report_task_path())
            .context("Failed to set up the SonarQube client")?;
        context = context.with_analysis_service(Arc::new(client));
    }

    let orchestrator = RunOrchestrator::new(Some(Box::new(LoggingHandler)));
    Ok(orchestrator.execute(&mut context).await)
}

pub fn handle_config(args: &RunArgs) -> i32 {
    match load_config(args) {
        Ok(config) => {
            println!("{}", config);
            0
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
