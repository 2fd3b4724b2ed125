use super::error::AnalysisError;
use super::result::AnalysisResult;
use super::tool::AnalysisTool;

/// Markdown hard line break terminating each summary line
pub const SUMMARY_LINE_BREAK: &str = "  \n";

/// Counts summed over every module's result for one tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationTotals {
    pub total_violations: u32,
    pub files_with_violations: u32,
}

/// Combines per-module results into totals and user-facing summary lines
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn aggregate_totals<'a>(
        results: impl IntoIterator<Item = &'a AnalysisResult>,
    ) -> ViolationTotals {
        results
            .into_iter()
            .fold(ViolationTotals::default(), |acc, result| ViolationTotals {
                total_violations: acc.total_violations.saturating_add(result.total_violations()),
                files_with_violations: acc
                    .files_with_violations
                    .saturating_add(result.files_with_violations()),
            })
    }

    /// One display line for `tool` over all of its module results
    pub fn summarize<'a>(
        tool: AnalysisTool,
        results: impl IntoIterator<Item = &'a AnalysisResult>,
    ) -> Result<String, AnalysisError> {
        Self::summary_line(tool, Self::aggregate_totals(results))
    }

    /// Pure function of the tool and its totals.
    ///
    /// Count combinations no phrasing can describe (violations without files,
    /// a single violation spread over several files) are rejected rather than
    /// rendered.
    pub fn summary_line(tool: AnalysisTool, totals: ViolationTotals) -> Result<String, AnalysisError> {
        let name = tool.name();
        match (totals.total_violations, totals.files_with_violations) {
            (0, _) => Ok(format!("{} found no violations.", name)),
            (1, 1) => Ok(format!("{} found 1 violation in 1 file.", name)),
            (n, 1) if n > 1 => Ok(format!("{} found {} violations in 1 file.", name, n)),
            (n, m) if n > 1 && m > 1 => {
                Ok(format!("{} found {} violations in {} files.", name, n, m))
            }
            (n, m) => Err(AnalysisError::Aggregation {
                tool,
                total_violations: n,
                files_with_violations: m,
            }),
        }
    }

    /// Renders summary lines, in the given order, as the markdown build summary
    pub fn render(lines: &[String]) -> String {
        lines
            .iter()
            .map(|line| format!("{}{}", line, SUMMARY_LINE_BREAK))
            .collect()
    }
}
