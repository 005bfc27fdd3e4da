use std::process;

use clap::CommandFactory;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gauge_docker_java::{
    cli::{Cli, parse_args},
    config::SessionConfig,
    error::SupervisorError,
    exit::ExitOutcome,
    session::Session,
};

/// Exit code when no action flag is given.
const USAGE_EXIT_CODE: i32 = 2;

fn main() {
    let args = parse_args();
    init_logging(&args);

    if !args.start {
        // Stdout belongs to the runner protocol.
        eprintln!("{}", Cli::command().render_help());
        process::exit(USAGE_EXIT_CODE);
    }

    match start(&args) {
        Ok(outcome) => process::exit(outcome.code()),
        Err(err) => {
            eprintln!("{err}");
            process::exit(err.exit_code());
        }
    }
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Gauge reads stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn start(args: &Cli) -> Result<ExitOutcome, SupervisorError> {
    let config = SessionConfig::from_env()?
        .with_runtime(&args.runtime)
        .with_image(&args.image)
        .with_runner_version(&args.runner_version);

    info!("Java Plugin Version: {}", config.runner_version);
    Session::new(&config).run()
}
