use super::error::AnalysisError;
use super::result::AnalysisResult;
use super::tool::AnalysisTool;
use crate::build_tool::BuildTool;
use roxmltree::{Document, Node};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Reads a tool's XML report from a module and counts its findings.
///
/// Absent, empty and foreign reports all produce a zero-valued result; only a
/// report that exists and is not XML at all is an error.
pub struct OutputParser {
    build_tool: BuildTool,
}

impl OutputParser {
    pub fn new(build_tool: BuildTool) -> Self {
        Self { build_tool }
    }

    pub fn parse_tool_output(
        &self,
        module_root: &Path,
        tool: AnalysisTool,
    ) -> Result<AnalysisResult, AnalysisError> {
        let location = tool.report_location(self.build_tool);
        let xml_path = module_root.join(&location.xml);

        if !xml_path.is_file() {
            debug!(tool = %tool, path = %xml_path.display(), "Report XML not found");
            return Ok(AnalysisResult::empty(tool));
        }

        let content = fs::read_to_string(&xml_path).map_err(|source| AnalysisError::Read {
            path: xml_path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            debug!(tool = %tool, path = %xml_path.display(), "Report XML is empty");
            return Ok(AnalysisResult::empty(tool));
        }

        let doc = Document::parse(&content).map_err(|e| AnalysisError::MalformedOutput {
            tool,
            path: xml_path.clone(),
            message: e.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != tool.root_element() {
            debug!(
                tool = %tool,
                root = root.tag_name().name(),
                path = %xml_path.display(),
                "Report has an unexpected root element, ignoring"
            );
            return Ok(AnalysisResult::empty(tool));
        }

        let (files_with_violations, total_violations) = count_violations(root, tool);
        let mut result = AnalysisResult::empty(tool)
            .with_counts(files_with_violations, total_violations)
            .with_xml_path(xml_path);

        // The HTML rendering is only generated when there is something to show
        if total_violations > 0 {
            let html_path = module_root.join(&location.html);
            if html_path.is_file() {
                result = result.with_html_path(html_path);
            } else {
                info!(tool = %tool, path = %html_path.display(), "Report HTML not found");
            }
        }

        debug!(
            tool = %tool,
            module = %module_root.display(),
            files = files_with_violations,
            violations = total_violations,
            "Parsed report"
        );

        Ok(result)
    }
}

/// Returns (distinct files with at least one violation, total violation
/// entries) under a report root.
///
/// Checkstyle lists every checked file, clean ones included, so entries
/// without violation children are not counted as files.
fn count_violations(root: Node<'_, '_>, tool: AnalysisTool) -> (u32, u32) {
    let mut named_files = BTreeSet::new();
    let mut unnamed_files = 0usize;
    let mut total = 0usize;

    for file in root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == tool.file_element())
    {
        let violations = file
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == tool.violation_element())
            .count();
        if violations == 0 {
            continue;
        }

        match file.attribute("name") {
            Some(name) => {
                named_files.insert(name);
            }
            None => unnamed_files += 1,
        }
        total += violations;
    }

    (
        saturating_u32(named_files.len() + unnamed_files),
        saturating_u32(total),
    )
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ResultAggregator;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PMD_TWO_FILES: &str = include_str!("../../tests/fixtures/reports/pmd-two-files.xml");
    const PMD_NO_FILES: &str = include_str!("../../tests/fixtures/reports/pmd-no-files.xml");
    const CHECKSTYLE: &str = include_str!("../../tests/fixtures/reports/checkstyle-result.xml");

    fn module_with_report(relative: &str, content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        dir
    }

    fn parser() -> OutputParser {
        OutputParser::new(BuildTool::Maven)
    }

    #[test]
    fn test_counts_files_and_violations() {
        let dir = module_with_report("target/pmd.xml", PMD_TWO_FILES);

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result.files_with_violations(), 2);
        assert_eq!(result.total_violations(), 3);
        assert_eq!(
            result.xml_file_path(),
            Some(dir.path().join("target/pmd.xml").as_path())
        );
        // No HTML on disk: logged, not fatal
        assert!(result.html_file_path().is_none());
    }

    #[test]
    fn test_html_attached_when_present() {
        let dir = module_with_report("target/pmd.xml", PMD_TWO_FILES);
        fs::create_dir_all(dir.path().join("target/site")).unwrap();
        fs::write(dir.path().join("target/site/pmd.html"), "<html/>").unwrap();

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(
            result.html_file_path(),
            Some(dir.path().join("target/site/pmd.html").as_path())
        );
    }

    #[test]
    fn test_html_not_looked_up_without_violations() {
        let dir = module_with_report("target/pmd.xml", PMD_NO_FILES);
        fs::create_dir_all(dir.path().join("target/site")).unwrap();
        fs::write(dir.path().join("target/site/pmd.html"), "<html/>").unwrap();

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result.total_violations(), 0);
        assert_eq!(result.files_with_violations(), 0);
        assert!(result.xml_file_path().is_some());
        assert!(result.html_file_path().is_none());
    }

    #[test]
    fn test_missing_report_is_zero_result() {
        let dir = TempDir::new().unwrap();

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result, AnalysisResult::empty(AnalysisTool::Pmd));
    }

    #[test]
    fn test_empty_report_is_zero_result() {
        let dir = module_with_report("target/pmd.xml", "  \n");

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result, AnalysisResult::empty(AnalysisTool::Pmd));
    }

    #[test]
    fn test_malformed_report_is_error() {
        let dir = module_with_report("target/pmd.xml", "this is not xml <pmd");

        let result = parser().parse_tool_output(dir.path(), AnalysisTool::Pmd);

        match result {
            Err(AnalysisError::MalformedOutput { tool, path, .. }) => {
                assert_eq!(tool, AnalysisTool::Pmd);
                assert_eq!(path, dir.path().join("target/pmd.xml"));
            }
            other => panic!("Expected MalformedOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_root_element_is_zero_result() {
        let dir = module_with_report(
            "target/pmd.xml",
            "<?xml version=\"1.0\"?><cpd><duplication lines=\"3\"/></cpd>",
        );

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result, AnalysisResult::empty(AnalysisTool::Pmd));
    }

    #[test]
    fn test_file_without_violations_is_not_counted() {
        let dir = module_with_report(
            "target/pmd.xml",
            r#"<pmd><file name="A.java"/><file name="B.java"><violation/></file></pmd>"#,
        );

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result.files_with_violations(), 1);
        assert_eq!(result.total_violations(), 1);
    }

    #[test]
    fn test_repeated_file_entries_counted_once() {
        let dir = module_with_report(
            "target/pmd.xml",
            r#"<pmd>
                 <file name="A.java"><violation/></file>
                 <file name="A.java"><violation/><violation/></file>
               </pmd>"#,
        );

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result.files_with_violations(), 1);
        assert_eq!(result.total_violations(), 3);
    }

    #[test]
    fn test_checkstyle_report() {
        let dir = module_with_report("target/checkstyle-result.xml", CHECKSTYLE);

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Checkstyle)
            .unwrap();

        // Clean.java is listed without <error> children
        assert_eq!(result.files_with_violations(), 2);
        assert_eq!(result.total_violations(), 4);
    }

    #[test]
    fn test_checkstyle_single_error_among_clean_files() {
        let dir = module_with_report(
            "target/checkstyle-result.xml",
            r#"<checkstyle>
                 <file name="A.java"><error line="1"/></file>
                 <file name="B.java"></file>
                 <file name="C.java"/>
               </checkstyle>"#,
        );

        let result = parser()
            .parse_tool_output(dir.path(), AnalysisTool::Checkstyle)
            .unwrap();

        assert_eq!(result.files_with_violations(), 1);
        assert_eq!(result.total_violations(), 1);
        assert_eq!(
            ResultAggregator::summarize(AnalysisTool::Checkstyle, [&result]).unwrap(),
            "Checkstyle found 1 violation in 1 file."
        );
    }

    #[test]
    fn test_gradle_layout() {
        let dir = module_with_report("build/reports/pmd/main.xml", PMD_TWO_FILES);

        let result = OutputParser::new(BuildTool::Gradle)
            .parse_tool_output(dir.path(), AnalysisTool::Pmd)
            .unwrap();

        assert_eq!(result.total_violations(), 3);
        assert_eq!(
            result.xml_file_path().map(PathBuf::from),
            Some(dir.path().join("build/reports/pmd/main.xml"))
        );
    }
}
