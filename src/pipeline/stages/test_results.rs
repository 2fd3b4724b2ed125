use crate::pipeline::context::RunContext;
use crate::pipeline::report::Stage;
use crate::pipeline::stage::RunStage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Publishes JUnit result files produced by the build's tests
pub struct TestResultsStage;

/// Files under `root` matching `glob`, sorted.
///
/// Ignore files are not honoured: test reports live in build output
/// directories that are usually git-ignored.
pub fn find_test_results(root: &Path, glob: &str) -> Result<Vec<PathBuf>> {
    let mut override_builder = OverrideBuilder::new(root);
    override_builder
        .add(glob)
        .with_context(|| format!("Invalid test results pattern '{}'", glob))?;
    let overrides = override_builder
        .build()
        .with_context(|| format!("Invalid test results pattern '{}'", glob))?;

    let mut files = Vec::new();
    for result in WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .overrides(overrides)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

#[async_trait]
impl RunStage for TestResultsStage {
    fn stage(&self) -> Stage {
        Stage::TestResults
    }

    fn skip_reason(&self, context: &RunContext) -> Option<String> {
        (!context.config.publish_junit).then(|| "test result publishing disabled".to_string())
    }

    async fn execute(&self, context: &mut RunContext) -> Result<()> {
        let config = context.config.clone();
        let files = find_test_results(&config.sources_dir, &config.test_results_glob)?;

        if files.is_empty() {
            warn!(
                pattern = %config.test_results_glob,
                "No test result files matched"
            );
            return Ok(());
        }

        info!(count = files.len(), "Publishing test results");
        context
            .sink
            .publish_test_results(&files)
            .context("Failed to publish test results")?;
        Ok(())
    }
}
