//! Command-line assembly for the build tool invocations of a run

use super::ToolInvocation;
use crate::build_tool::BuildTool;
use crate::config::{SonarConfig, TaskConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the Gradle init script that injects the SonarQube plugin
pub const GRADLE_SONAR_INIT_SCRIPT: &str = "sonar.gradle";

const GRADLE_SONAR_INIT_CONTENT: &str = r#"initscript {
    repositories {
        maven { url "https://plugins.gradle.org/m2/" }
    }
    dependencies {
        classpath "org.sonarsource.scanner.gradle:sonarqube-gradle-plugin:2.6.2"
    }
}

rootProject {
    apply plugin: org.sonarqube.gradle.SonarQubePlugin
}
"#;

/// Builds the invocations a run needs from the task configuration
pub struct CommandBuilder<'a> {
    config: &'a TaskConfig,
    program: PathBuf,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: &'a TaskConfig, program: impl Into<PathBuf>) -> Self {
        Self {
            config,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn invocation(&self) -> ToolInvocation {
        ToolInvocation::new(&self.program, &self.config.sources_dir)
    }

    /// `mvn -version` / `gradle --version`
    pub fn version_probe(&self) -> ToolInvocation {
        self.invocation().arg(self.config.build_tool.version_arg())
    }

    /// Project selection, user options, goals, then one goal set per enabled
    /// analysis tool
    pub fn primary_build(&self) -> ToolInvocation {
        let build_tool = self.config.build_tool;
        let analysis_args = self
            .config
            .analysis_tools
            .iter()
            .flat_map(|tool| tool.build_args(build_tool));

        self.project_selection()
            .args(self.config.options.iter().cloned())
            .args(self.config.goals.iter().cloned())
            .args(analysis_args)
    }

    /// SonarQube scanner invocation.
    ///
    /// For Gradle the caller must place the init script first, see
    /// [`write_gradle_init_script`].
    pub fn sonar_analysis(&self, sonar: &SonarConfig) -> ToolInvocation {
        let invocation = self
            .project_selection()
            .args(self.config.options.iter().cloned())
            .args(sonar_properties(sonar));

        match self.config.build_tool {
            BuildTool::Maven => invocation.arg("sonar:sonar"),
            BuildTool::Gradle => invocation
                .args(["-I", &format!("./{}", GRADLE_SONAR_INIT_SCRIPT)])
                .arg("sonarqube"),
        }
    }

    fn project_selection(&self) -> ToolInvocation {
        let project_file = self.config.project_file_path();
        match self.config.build_tool {
            BuildTool::Maven => self
                .invocation()
                .args(["-f".to_string(), project_file.display().to_string()]),
            BuildTool::Gradle => {
                let project_dir = project_file
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.config.sources_dir.clone());
                self.invocation()
                    .args(["-p".to_string(), project_dir.display().to_string()])
            }
        }
    }
}

/// `-Dsonar.*` properties; unset credentials are left out
fn sonar_properties(sonar: &SonarConfig) -> Vec<String> {
    let optional = [
        ("sonar.login", &sonar.username),
        ("sonar.password", &sonar.password),
        ("sonar.jdbc.url", &sonar.db_url),
        ("sonar.jdbc.username", &sonar.db_username),
        ("sonar.jdbc.password", &sonar.db_password),
    ];

    std::iter::once(format!("-Dsonar.host.url={}", sonar.host_url))
        .chain(optional.iter().filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("-D{}={}", key, v))
        }))
        .collect()
}

/// Writes the SonarQube init script into `sources_dir`, replacing any
/// existing copy
pub fn write_gradle_init_script(sources_dir: &Path) -> io::Result<PathBuf> {
    let path = sources_dir.join(GRADLE_SONAR_INIT_SCRIPT);
    fs::write(&path, GRADLE_SONAR_INIT_CONTENT)?;
    Ok(path)
}

/// Splits a user-supplied option string on whitespace, keeping double-quoted
/// sections together
pub fn split_arguments(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisTool;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(build_tool: BuildTool) -> TaskConfig {
        TaskConfig {
            sources_dir: PathBuf::from("/src"),
            build_tool,
            project_file: PathBuf::from(build_tool.default_project_file()),
            goals: vec!["package".to_string()],
            options: vec!["-B".to_string()],
            analysis_tools: vec![AnalysisTool::Pmd],
            ..TaskConfig::default()
        }
    }

    fn sonar() -> SonarConfig {
        SonarConfig {
            host_url: "http://sonar:9000".to_string(),
            username: Some("admin".to_string()),
            password: Some(String::new()),
            db_url: None,
            db_username: None,
            db_password: None,
            wait_for_quality_gate: false,
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_maven_primary_build() {
        let config = config(BuildTool::Maven);
        let invocation = CommandBuilder::new(&config, "mvn").primary_build();

        assert_eq!(
            invocation.args,
            vec!["-f", "/src/pom.xml", "-B", "package", "pmd:pmd", "-DlinkXRef=false"]
        );
        assert_eq!(invocation.working_dir, PathBuf::from("/src"));
    }

    #[test]
    fn test_gradle_primary_build() {
        let mut config = config(BuildTool::Gradle);
        config.analysis_tools = vec![AnalysisTool::Pmd, AnalysisTool::Checkstyle];
        let invocation = CommandBuilder::new(&config, "gradle").primary_build();

        assert_eq!(
            invocation.args,
            vec!["-p", "/src", "-B", "package", "pmdMain", "checkstyleMain"]
        );
    }

    #[test]
    fn test_version_probe() {
        let config = config(BuildTool::Maven);
        let invocation = CommandBuilder::new(&config, "/opt/mvn/bin/mvn").version_probe();

        assert_eq!(invocation.program, PathBuf::from("/opt/mvn/bin/mvn"));
        assert_eq!(invocation.args, vec!["-version"]);
    }

    #[test]
    fn test_maven_sonar_skips_empty_credentials() {
        let config = config(BuildTool::Maven);
        let invocation = CommandBuilder::new(&config, "mvn").sonar_analysis(&sonar());

        assert_eq!(
            invocation.args,
            vec![
                "-f",
                "/src/pom.xml",
                "-B",
                "-Dsonar.host.url=http://sonar:9000",
                "-Dsonar.login=admin",
                "sonar:sonar"
            ]
        );
    }

    #[test]
    fn test_gradle_sonar_uses_init_script() {
        let config = config(BuildTool::Gradle);
        let invocation = CommandBuilder::new(&config, "gradle").sonar_analysis(&sonar());

        let tail: Vec<&str> = invocation.args.iter().rev().take(3).map(String::as_str).collect();
        assert_eq!(tail, vec!["sonarqube", "./sonar.gradle", "-I"]);
    }

    #[test]
    fn test_write_gradle_init_script() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GRADLE_SONAR_INIT_SCRIPT), "stale").unwrap();

        let path = write_gradle_init_script(dir.path()).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("SonarQubePlugin"));
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(
            split_arguments(r#"-B  -Dmsg="two words" -q"#),
            vec!["-B", "-Dmsg=two words", "-q"]
        );
        assert!(split_arguments("   ").is_empty());
        assert_eq!(split_arguments(r#""""#), vec![""]);
    }
}
