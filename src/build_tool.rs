//! Build tools the step can drive (Maven, Gradle)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The external build tool invoked for the primary build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    Maven,
    Gradle,
}

impl BuildTool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Maven => "Maven",
            Self::Gradle => "Gradle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Maven" | "maven" | "mvn" => Some(Self::Maven),
            "Gradle" | "gradle" => Some(Self::Gradle),
            _ => None,
        }
    }

    pub fn all_variants() -> &'static [Self] {
        &[Self::Maven, Self::Gradle]
    }

    /// Executable looked up on PATH when no explicit tool path is configured
    pub fn executable(&self) -> &'static str {
        match self {
            Self::Maven => "mvn",
            Self::Gradle => "gradle",
        }
    }

    pub fn version_arg(&self) -> &'static str {
        match self {
            Self::Maven => "-version",
            Self::Gradle => "--version",
        }
    }

    /// Project descriptor file names; any one of them marks a module
    pub fn project_markers(&self) -> &'static [&'static str] {
        match self {
            Self::Maven => &["pom.xml"],
            Self::Gradle => &["build.gradle", "build.gradle.kts"],
        }
    }

    /// Directory the build writes its output into, relative to a module root
    pub fn output_dir(&self) -> &'static str {
        match self {
            Self::Maven => "target",
            Self::Gradle => "build",
        }
    }

    pub fn default_project_file(&self) -> &'static str {
        self.project_markers()[0]
    }

    /// True when `dir` directly contains a project descriptor and a build output directory
    pub fn is_module_root(&self, dir: &Path) -> bool {
        let has_descriptor = self
            .project_markers()
            .iter()
            .any(|marker| dir.join(marker).is_file());

        has_descriptor && dir.join(self.output_dir()).is_dir()
    }

    /// Location of the scanner's task receipt, relative to the build root
    pub fn sonar_report_task(&self) -> &'static str {
        match self {
            Self::Maven => "target/sonar/report-task.txt",
            Self::Gradle => "build/sonar/report-task.txt",
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_name_with_aliases() {
        assert_eq!(BuildTool::from_name("Maven"), Some(BuildTool::Maven));
        assert_eq!(BuildTool::from_name("mvn"), Some(BuildTool::Maven));
        assert_eq!(BuildTool::from_name("gradle"), Some(BuildTool::Gradle));
        assert_eq!(BuildTool::from_name("ant"), None);
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&BuildTool::Gradle).unwrap(),
            "\"gradle\""
        );
    }

    #[test]
    fn test_maven_module_root_needs_both_markers() {
        let dir = TempDir::new().unwrap();
        assert!(!BuildTool::Maven.is_module_root(dir.path()));

        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        assert!(!BuildTool::Maven.is_module_root(dir.path()));

        fs::create_dir(dir.path().join("target")).unwrap();
        assert!(BuildTool::Maven.is_module_root(dir.path()));
    }

    #[test]
    fn test_output_marker_must_be_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        fs::write(dir.path().join("target"), "not a directory").unwrap();

        assert!(!BuildTool::Maven.is_module_root(dir.path()));
    }

    #[test]
    fn test_gradle_accepts_kotlin_script() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("build.gradle.kts"), "plugins {}").unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();

        assert!(BuildTool::Gradle.is_module_root(dir.path()));
        assert!(!BuildTool::Maven.is_module_root(dir.path()));
    }
}
