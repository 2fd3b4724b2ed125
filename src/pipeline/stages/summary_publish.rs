use crate::analysis::ResultAggregator;
use crate::pipeline::context::RunContext;
use crate::pipeline::report::{Stage, StageOutcome};
use crate::pipeline::stage::RunStage;
use crate::sink::{SUMMARY_ATTACHMENT_NAME, SUMMARY_ATTACHMENT_TYPE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use tracing::info;

/// Writes the markdown summary and attaches it to the build
pub struct SummaryPublishStage;

#[async_trait]
impl RunStage for SummaryPublishStage {
    fn stage(&self) -> Stage {
        Stage::SummaryPublish
    }

    fn skip_reason(&self, context: &RunContext) -> Option<String> {
        match context.report.outcome(Stage::ResultCollection) {
            None | Some(StageOutcome::Skipped) => {
                Some("code analysis results were not collected".to_string())
            }
            Some(StageOutcome::Failed) if context.summary_lines.is_empty() => {
                Some("code analysis collection failed before any summary line".to_string())
            }
            Some(_) => None,
        }
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let path = context.config.summary_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&path, ResultAggregator::render(&context.summary_lines))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), lines = context.summary_lines.len(), "Wrote build summary");

        context
            .sink
            .add_attachment(SUMMARY_ATTACHMENT_TYPE, SUMMARY_ATTACHMENT_NAME, &path)
            .context("Failed to attach the build summary")?;
        Ok(())
    }
}
