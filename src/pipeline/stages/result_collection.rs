use crate::analysis::{
    AnalysisTool, ArtifactStager, ModuleDescriptor, ModuleDiscovery, OutputParser,
    ResultAggregator,
};
use crate::pipeline::context::RunContext;
use crate::pipeline::report::{Stage, StageOutcome};
use crate::pipeline::stage::RunStage;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Discovers modules, parses each enabled tool's report per module, builds
/// the summary lines and uploads the staged reports.
///
/// A failure for one (tool, module) pair is logged and counted; the rest of
/// the modules and tools are still processed.
pub struct ResultCollectionStage;

/// One summary line per tool, in enablement order.
///
/// A tool whose totals cannot be phrased is logged and left out; the count
/// of such tools is returned alongside the lines.
fn summarize_tools(tools: &[AnalysisTool], modules: &[ModuleDescriptor]) -> (Vec<String>, usize) {
    let mut lines = Vec::new();
    let mut failures = 0;
    for &tool in tools {
        let results = modules.iter().filter_map(|module| module.results.get(tool));
        match ResultAggregator::summarize(tool, results) {
            Ok(line) => {
                info!(tool = %tool, "{}", line);
                lines.push(line);
            }
            Err(e) => {
                error!(tool = %tool, "{}", e);
                failures += 1;
            }
        }
    }
    (lines, failures)
}

#[async_trait]
impl RunStage for ResultCollectionStage {
    fn stage(&self) -> Stage {
        Stage::ResultCollection
    }

    fn skip_reason(&self, context: &RunContext) -> Option<String> {
        if !context.config.has_analysis_tools() {
            Some("no code analysis tools enabled".to_string())
        } else if context.report.outcome(Stage::PrimaryBuild) == Some(StageOutcome::Failed) {
            Some("build failed, no analysis output to collect".to_string())
        } else {
            None
        }
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let config = context.config.clone();
        let mut stager = ArtifactStager::new(config.staging_root(), config.run_id.clone());
        stager
            .clean()
            .context("Failed to prepare the staging directory")?;

        let mut modules = ModuleDiscovery::new(config.build_tool)
            .discover(&config.sources_dir)
            .context("Module discovery failed")?;
        if modules.is_empty() {
            warn!(
                sources = %config.sources_dir.display(),
                "No built modules found, nothing to collect"
            );
        }

        let mut failures = 0usize;
        let parser = OutputParser::new(config.build_tool);
        for module in &mut modules {
            for &tool in &config.analysis_tools {
                match parser.parse_tool_output(&module.root_dir, tool) {
                    Ok(result) => {
                        module.results.insert(result);
                    }
                    Err(e) => {
                        error!(tool = %tool, module = %module.name, "{}", e);
                        failures += 1;
                    }
                }
            }
        }

        let (summary_lines, summary_failures) = summarize_tools(&config.analysis_tools, &modules);
        failures += summary_failures;

        for &tool in &config.analysis_tools {
            for module in &modules {
                let Some(result) = module.results.get(tool) else {
                    continue;
                };
                let staged = match stager.stage(tool, module, &result.report_files()) {
                    Ok(Some(staged)) => staged,
                    Ok(None) => continue,
                    Err(e) => {
                        error!(tool = %tool, module = %module.name, "{}", e);
                        failures += 1;
                        continue;
                    }
                };
                if let Err(e) = context.sink.upload_artifact(
                    &staged.container,
                    &staged.artifact_name,
                    &staged.directory,
                ) {
                    error!(
                        tool = %tool,
                        module = %module.name,
                        artifact = %staged.artifact_name,
                        "Upload failed: {}",
                        e
                    );
                    failures += 1;
                }
            }
        }

        context.modules = modules;
        context.summary_lines = summary_lines;

        if failures > 0 {
            bail!("{} code analysis result(s) could not be processed", failures);
        }
        Ok(())
    }
}
