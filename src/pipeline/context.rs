//! Run context shared by all stages

use super::report::RunReport;
use crate::analysis::ModuleDescriptor;
use crate::config::TaskConfig;
use crate::runner::BuildToolRunner;
use crate::sink::ArtifactSink;
use crate::sonar::AnalysisService;
use std::path::PathBuf;
use std::sync::Arc;

/// Long-lived collaborators plus the state a run accumulates
pub struct RunContext {
    pub config: Arc<TaskConfig>,
    pub runner: Arc<dyn BuildToolRunner>,
    pub sink: Arc<dyn ArtifactSink>,

    /// Present only when SonarQube analysis is configured
    pub analysis_service: Option<Arc<dyn AnalysisService>>,

    /// Executable resolved by the tool check
    pub tool_program: Option<PathBuf>,

    /// Modules discovered during result collection, with their results
    pub modules: Vec<ModuleDescriptor>,

    /// One line per enabled tool, in enablement order
    pub summary_lines: Vec<String>,

    pub report: RunReport,
}

impl RunContext {
    pub fn new(
        config: Arc<TaskConfig>,
        runner: Arc<dyn BuildToolRunner>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            config,
            runner,
            sink,
            analysis_service: None,
            tool_program: None,
            modules: Vec::new(),
            summary_lines: Vec::new(),
            report: RunReport::new(),
        }
    }

    pub fn with_analysis_service(mut self, service: Arc<dyn AnalysisService>) -> Self {
        self.analysis_service = Some(service);
        self
    }
}
