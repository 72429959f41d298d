//! Curio CLI entry point.

use anyhow::Result;
use clap::Parser;
use curio::cli::{commands, Cli, Commands};
use curio::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stderr keeps stdout clean for the MCP transport
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("curio={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let config_path = Settings::config_path(cli.config.as_deref());
    let settings = Settings::load_from(Some(&config_path))?;

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Podcast {
            goal,
            scenario,
            live,
            run,
        } => {
            commands::run_podcast(goal, scenario, live, run, settings).await?;
        }

        Commands::Discover { topic, run } => {
            commands::run_discover(&topic, run, settings).await?;
        }

        Commands::Tools => {
            commands::run_tools(settings)?;
        }

        Commands::Saved { remove } => {
            commands::run_saved(remove, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, &config_path, settings)?;
        }
    }

    Ok(())
}
