//! Squash CLI - render files through the compressor and watch their loudness.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "squash")]
#[command(author, version, about = "Dynamics compression renderer and loudness monitor", long_about = None)]
struct Cli {
    /// Settings file to use instead of the user settings
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an audio file and write the result as a float WAV
    Render(commands::render::RenderArgs),

    /// Play a file through the live graph and draw input/output meters
    Monitor(commands::monitor::MonitorArgs),

    /// Show or create the settings file
    Settings(commands::settings::SettingsArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Render(args) => commands::render::run(args, config),
        Commands::Monitor(args) => commands::monitor::run(args, config),
        Commands::Settings(args) => commands::settings::run(args, config),
    }
}
