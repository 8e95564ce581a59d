//! Kinoprobe CLI - Main Entry Point
//!
//! Runs the API and UI acceptance suites against the movie catalog and
//! prints the results.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

use commands::{api, ui, Context};

/// Kinoprobe - movie catalog acceptance harness
#[derive(Parser)]
#[command(name = "kinoprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Harness configuration file
    #[arg(
        long,
        env = "KINOPROBE_CONFIG",
        default_value_os_t = kinoprobe_common::default_config_path(),
        global = true
    )]
    config: PathBuf,

    /// API case dataset
    #[arg(
        long,
        env = "KINOPROBE_DATASET",
        default_value_os_t = kinoprobe_common::default_dataset_path(),
        global = true
    )]
    dataset: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Directory to write `<suite>-results.json` into
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// API suite
    #[command(subcommand)]
    Api(api::ApiCommands),

    /// Browser UI suite
    #[command(subcommand)]
    Ui(ui::UiCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Using config {} and dataset {}",
        cli.config.display(),
        cli.dataset.display()
    );

    let ctx = Context {
        config: cli.config,
        dataset: cli.dataset,
        format: cli.format,
        output: cli.output,
    };

    let passed = match cli.command {
        Commands::Api(cmd) => api::execute(cmd, &ctx).await?,
        Commands::Ui(cmd) => ui::execute(cmd, &ctx).await?,
        Commands::Version => {
            println!("Kinoprobe CLI v{}", kinoprobe_common::VERSION);
            true
        }
    };

    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
