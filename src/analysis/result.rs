//! Per-module analysis data model

use super::tool::AnalysisTool;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One tool's findings on one module.
///
/// Built by the output parser and never mutated afterwards; the consuming
/// `with_*` methods exist only for construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    tool: AnalysisTool,
    files_with_violations: u32,
    total_violations: u32,
    xml_file_path: Option<PathBuf>,
    html_file_path: Option<PathBuf>,
}

impl AnalysisResult {
    /// Zero-valued result with no report paths
    pub fn empty(tool: AnalysisTool) -> Self {
        Self {
            tool,
            files_with_violations: 0,
            total_violations: 0,
            xml_file_path: None,
            html_file_path: None,
        }
    }

    pub fn with_counts(mut self, files_with_violations: u32, total_violations: u32) -> Self {
        self.files_with_violations = files_with_violations;
        self.total_violations = total_violations;
        self
    }

    pub fn with_xml_path(mut self, path: PathBuf) -> Self {
        self.xml_file_path = Some(path);
        self
    }

    pub fn with_html_path(mut self, path: PathBuf) -> Self {
        self.html_file_path = Some(path);
        self
    }

    pub fn tool(&self) -> AnalysisTool {
        self.tool
    }

    pub fn files_with_violations(&self) -> u32 {
        self.files_with_violations
    }

    pub fn total_violations(&self) -> u32 {
        self.total_violations
    }

    pub fn xml_file_path(&self) -> Option<&Path> {
        self.xml_file_path.as_deref()
    }

    pub fn html_file_path(&self) -> Option<&Path> {
        self.html_file_path.as_deref()
    }

    /// Raw report files that exist for this result, XML first
    pub fn report_files(&self) -> Vec<PathBuf> {
        self.xml_file_path
            .iter()
            .chain(self.html_file_path.iter())
            .cloned()
            .collect()
    }
}

/// Tool -> result mapping for a single module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolResults(BTreeMap<AnalysisTool, AnalysisResult>);

impl ToolResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` under its own tool, replacing any earlier result for that tool
    pub fn insert(&mut self, result: AnalysisResult) -> Option<AnalysisResult> {
        self.0.insert(result.tool(), result)
    }

    pub fn get(&self, tool: AnalysisTool) -> Option<&AnalysisResult> {
        self.0.get(&tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A discovered build sub-unit. Identity is `root_dir`; names may collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub root_dir: PathBuf,
    pub results: ToolResults,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, root_dir: PathBuf) -> Self {
        Self {
            name: name.into(),
            root_dir,
            results: ToolResults::new(),
        }
    }
}
