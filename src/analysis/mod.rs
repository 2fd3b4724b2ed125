//! Code-analysis result collection
//!
//! Discovers build modules, reads each enabled tool's report per module,
//! aggregates the counts into summary lines and stages the raw reports for
//! upload.

pub mod aggregator;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod result;
pub mod staging;
pub mod tool;

pub use aggregator::{ResultAggregator, ViolationTotals, SUMMARY_LINE_BREAK};
pub use discovery::{ModuleDiscovery, ROOT_MODULE_NAME};
pub use error::AnalysisError;
pub use parser::OutputParser;
pub use result::{AnalysisResult, ModuleDescriptor, ToolResults};
pub use staging::{ArtifactStager, StagedArtifact};
pub use tool::{AnalysisTool, ReportLocation};
