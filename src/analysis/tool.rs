//! Static-analysis tools whose reports are collected per module

use crate::build_tool::BuildTool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Closed set of supported analysis tools.
///
/// Results are keyed by this enum rather than by free-form strings, so a
/// misspelled tool name is a compile error instead of an empty lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTool {
    Pmd,
    Checkstyle,
}

/// Where a tool writes its reports, relative to a module root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation {
    pub xml: PathBuf,
    pub html: PathBuf,
}

impl AnalysisTool {
    /// Display name used in summary lines ("PMD found ...")
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pmd => "PMD",
            Self::Checkstyle => "Checkstyle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PMD" | "pmd" => Some(Self::Pmd),
            "Checkstyle" | "checkstyle" => Some(Self::Checkstyle),
            _ => None,
        }
    }

    pub fn all_variants() -> &'static [Self] {
        &[Self::Pmd, Self::Checkstyle]
    }

    /// Lowercase key used for staging directories and artifact names
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pmd => "pmd",
            Self::Checkstyle => "checkstyle",
        }
    }

    /// Root element a report from this tool must carry
    pub fn root_element(&self) -> &'static str {
        match self {
            Self::Pmd => "pmd",
            Self::Checkstyle => "checkstyle",
        }
    }

    pub fn file_element(&self) -> &'static str {
        "file"
    }

    pub fn violation_element(&self) -> &'static str {
        match self {
            Self::Pmd => "violation",
            Self::Checkstyle => "error",
        }
    }

    pub fn report_location(&self, build_tool: BuildTool) -> ReportLocation {
        let (xml, html) = match (build_tool, self) {
            (BuildTool::Maven, Self::Pmd) => ("target/pmd.xml", "target/site/pmd.html"),
            (BuildTool::Maven, Self::Checkstyle) => (
                "target/checkstyle-result.xml",
                "target/site/checkstyle.html",
            ),
            (BuildTool::Gradle, Self::Pmd) => {
                ("build/reports/pmd/main.xml", "build/reports/pmd/main.html")
            }
            (BuildTool::Gradle, Self::Checkstyle) => (
                "build/reports/checkstyle/main.xml",
                "build/reports/checkstyle/main.html",
            ),
        };

        ReportLocation {
            xml: PathBuf::from(xml),
            html: PathBuf::from(html),
        }
    }

    /// Extra goals/tasks appended to the primary build to produce the report
    pub fn build_args(&self, build_tool: BuildTool) -> Vec<String> {
        let args: &[&str] = match (build_tool, self) {
            // Cross-referencing is off to keep Maven's error output short
            (BuildTool::Maven, Self::Pmd) => &["pmd:pmd", "-DlinkXRef=false"],
            (BuildTool::Maven, Self::Checkstyle) => &["checkstyle:checkstyle"],
            (BuildTool::Gradle, Self::Pmd) => &["pmdMain"],
            (BuildTool::Gradle, Self::Checkstyle) => &["checkstyleMain"],
        };
        args.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for AnalysisTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_keys() {
        assert_eq!(AnalysisTool::Pmd.name(), "PMD");
        assert_eq!(AnalysisTool::Pmd.key(), "pmd");
        assert_eq!(AnalysisTool::Checkstyle.name(), "Checkstyle");
        assert_eq!(AnalysisTool::from_name("pmd"), Some(AnalysisTool::Pmd));
        assert_eq!(AnalysisTool::from_name("findbugs"), None);
    }

    #[test]
    fn test_maven_pmd_report_location() {
        let location = AnalysisTool::Pmd.report_location(BuildTool::Maven);
        assert_eq!(location.xml, PathBuf::from("target/pmd.xml"));
        assert_eq!(location.html, PathBuf::from("target/site/pmd.html"));
    }

    #[test]
    fn test_gradle_report_locations_live_under_build() {
        for tool in AnalysisTool::all_variants() {
            let location = tool.report_location(BuildTool::Gradle);
            assert!(location.xml.starts_with("build/reports"));
            assert!(location.html.starts_with("build/reports"));
        }
    }

    #[test]
    fn test_maven_pmd_goals() {
        assert_eq!(
            AnalysisTool::Pmd.build_args(BuildTool::Maven),
            vec!["pmd:pmd", "-DlinkXRef=false"]
        );
        assert_eq!(
            AnalysisTool::Checkstyle.build_args(BuildTool::Gradle),
            vec!["checkstyleMain"]
        );
    }

    #[test]
    fn test_ordering_follows_declaration() {
        let mut tools = vec![AnalysisTool::Checkstyle, AnalysisTool::Pmd];
        tools.sort();
        assert_eq!(tools, vec![AnalysisTool::Pmd, AnalysisTool::Checkstyle]);
    }
}
