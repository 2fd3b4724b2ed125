use crate::analysis::AnalysisTool;
use crate::build_tool::BuildTool;
use crate::config::{SonarConfig, TaskConfig};
use crate::runner::command::split_arguments;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CI build step: runs Maven or Gradle and reports code analysis results
#[derive(Parser, Debug)]
#[command(
    name = "buildgate",
    about = "CI build step: runs Maven or Gradle and reports code analysis results",
    version,
    long_about = "buildgate runs the primary build, an optional SonarQube analysis, collects \
                  PMD and Checkstyle reports from every built module and reports a summary and \
                  a pass/fail result to the pipeline.\n\n\
                  Settings are read from the pipeline environment (BUILD_* and BUILDGATE_* \
                  variables); flags given here override them."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the build step",
        long_about = "Runs the build, the optional SonarQube analysis and code analysis \
                      collection, then reports the result.\n\n\
                      Examples:\n  \
                      buildgate run\n  \
                      buildgate run --goals \"clean verify\" --pmd\n  \
                      buildgate run --build-tool gradle --checkstyle --sonar"
    )]
    Run(RunArgs),

    #[command(about = "Print the effective configuration")]
    Config(RunArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildToolArg {
    Maven,
    Gradle,
}

impl From<BuildToolArg> for BuildTool {
    fn from(arg: BuildToolArg) -> Self {
        match arg {
            BuildToolArg::Maven => BuildTool::Maven,
            BuildToolArg::Gradle => BuildTool::Gradle,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(long, value_name = "DIR", help = "Sources directory")]
    pub sources_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Artifact staging directory")]
    pub staging_dir: Option<PathBuf>,

    #[arg(long, value_enum, help = "Build tool to run")]
    pub build_tool: Option<BuildToolArg>,

    #[arg(long, value_name = "PATH", help = "Path to the build tool executable")]
    pub tool_path: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "pom.xml or build.gradle to build")]
    pub project_file: Option<PathBuf>,

    #[arg(long, value_name = "GOALS", help = "Goals or tasks, space separated")]
    pub goals: Option<String>,

    #[arg(long, value_name = "ARGS", allow_hyphen_values = true, help = "Extra build tool arguments")]
    pub options: Option<String>,

    #[arg(long, help = "Run PMD and collect its results")]
    pub pmd: bool,

    #[arg(long, help = "Run Checkstyle and collect its results")]
    pub checkstyle: bool,

    #[arg(long, help = "Run a SonarQube analysis")]
    pub sonar: bool,

    #[arg(long, value_name = "URL", help = "SonarQube server URL")]
    pub sonar_host_url: Option<String>,

    #[arg(long, help = "Fail the step when the SonarQube quality gate fails")]
    pub wait_for_quality_gate: bool,

    #[arg(long, help = "Do not publish JUnit test results")]
    pub no_junit: bool,
}

impl RunArgs {
    /// Overrides environment-derived settings with the flags that were given
    pub fn apply(&self, config: &mut TaskConfig) {
        if let Some(dir) = &self.sources_dir {
            config.sources_dir = dir.clone();
        }
        if let Some(dir) = &self.staging_dir {
            config.staging_dir = dir.clone();
        }
        if let Some(build_tool) = self.build_tool {
            let previous = config.build_tool;
            config.build_tool = build_tool.into();
            if config.project_file == PathBuf::from(previous.default_project_file()) {
                config.project_file = PathBuf::from(config.build_tool.default_project_file());
            }
        }
        if let Some(path) = &self.tool_path {
            config.tool_path = Some(path.clone());
        }
        if let Some(file) = &self.project_file {
            config.project_file = file.clone();
        }
        if let Some(goals) = &self.goals {
            config.goals = split_arguments(goals);
        }
        if let Some(options) = &self.options {
            config.options = split_arguments(options);
        }

        for (enabled, tool) in [
            (self.pmd, AnalysisTool::Pmd),
            (self.checkstyle, AnalysisTool::Checkstyle),
        ] {
            if enabled && !config.analysis_tools.contains(&tool) {
                config.analysis_tools.push(tool);
            }
        }

        if self.sonar || self.sonar_host_url.is_some() || self.wait_for_quality_gate {
            let sonar = config
                .sonar
                .get_or_insert_with(|| SonarConfig::new(String::new()));
            if let Some(url) = &self.sonar_host_url {
                sonar.host_url = url.clone();
            }
            if self.wait_for_quality_gate {
                sonar.wait_for_quality_gate = true;
            }
        }

        if self.no_junit {
            config.publish_junit = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("buildgate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_run_flags_override_config() {
        let args = parse(&[
            "run",
            "--sources-dir",
            "/src",
            "--build-tool",
            "gradle",
            "--goals",
            "clean build",
            "--options",
            "--info --stacktrace",
            "--pmd",
            "--checkstyle",
            "--sonar-host-url",
            "http://sonar:9000",
        ]);
        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };

        let mut config = TaskConfig::default();
        run.apply(&mut config);

        assert_eq!(config.sources_dir, PathBuf::from("/src"));
        assert_eq!(config.build_tool, BuildTool::Gradle);
        assert_eq!(config.project_file, PathBuf::from("build.gradle"));
        assert_eq!(config.goals, vec!["clean", "build"]);
        assert_eq!(config.options, vec!["--info", "--stacktrace"]);
        assert_eq!(
            config.analysis_tools,
            vec![AnalysisTool::Pmd, AnalysisTool::Checkstyle]
        );
        assert_eq!(config.sonar.unwrap().host_url, "http://sonar:9000");
    }

    #[test]
    fn test_flags_do_not_duplicate_env_tools() {
        let args = parse(&["run", "--pmd"]);
        let Commands::Run(run) = args.command else {
            panic!("expected run");
        };

        let mut config = TaskConfig {
            analysis_tools: vec![AnalysisTool::Pmd],
            ..TaskConfig::default()
        };
        run.apply(&mut config);

        assert_eq!(config.analysis_tools, vec![AnalysisTool::Pmd]);
        assert!(config.sonar.is_none());
    }

    #[test]
    fn test_global_flags() {
        let args = parse(&["-v", "config"]);
        assert!(args.verbose);
        assert!(matches!(args.command, Commands::Config(_)));

        assert!(CliArgs::try_parse_from(["buildgate", "-v", "-q", "run"]).is_err());
    }
}
