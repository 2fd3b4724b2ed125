use buildgate::cli::commands::{CliArgs, Commands};
use buildgate::cli::handlers::{handle_config, handle_run};
use buildgate::util::logging::{self, LoggingConfig};
use buildgate::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("buildgate v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Run(run_args) => handle_run(run_args).await,
        Commands::Config(run_args) => handle_config(run_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let env_config = logging::config_from_env();

    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        env_config.level
    };

    logging::init_logging(LoggingConfig {
        level,
        ..env_config
    });
}
