//! Compiler diagnostics extracted from build tool output

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

impl IssueSeverity {
    /// Value of the `type` property on a pipeline issue
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIssue {
    pub severity: IssueSeverity,
    pub source_path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

fn issue_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([a-zA-Z0-9_ \-/.]+):\[([0-9]+),([0-9]+)\](.*)").expect("valid regex")
    })
}

/// Parses one stdout line of the form
/// `[ERROR] /src/App.java:[12,5] cannot find symbol`
pub fn parse_issue(line: &str) -> Option<BuildIssue> {
    let (severity, rest) = if let Some(rest) = line.strip_prefix("[ERROR]") {
        (IssueSeverity::Error, rest)
    } else if let Some(rest) = line.strip_prefix("[WARNING]") {
        (IssueSeverity::Warning, rest)
    } else {
        return None;
    };

    let captures = issue_pattern().captures(rest)?;
    Some(BuildIssue {
        severity,
        source_path: captures[1].trim().to_string(),
        line: captures[2].parse().ok()?,
        column: captures[3].parse().ok()?,
        message: captures[4].trim().to_string(),
    })
}

pub fn extract_issues<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<BuildIssue> {
    lines.into_iter().filter_map(parse_issue).collect()
}
