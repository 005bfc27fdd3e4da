//! Command-line interface for gauge-docker-java.
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::config::{DEFAULT_IMAGE, DEFAULT_RUNNER_VERSION, DEFAULT_RUNTIME};

/// Command-line interface for gauge-docker-java.
#[derive(Parser, Debug)]
#[command(name = "gauge-docker-java", version)]
#[command(about = "Runs the Gauge Java runner inside a Docker container", long_about = None)]
pub struct Cli {
    /// Start the docker-java runner.
    #[arg(long)]
    pub start: bool,

    /// Logging verbosity: off, error, warn, info, debug, trace, or 0-5.
    /// Falls back to `RUST_LOG`, then `info`.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,

    /// Container runtime executable.
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Image the runner container is started from.
    #[arg(long, default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// Version of the Java runner installed in the image.
    #[arg(long, default_value = DEFAULT_RUNNER_VERSION)]
    pub runner_version: String,
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
