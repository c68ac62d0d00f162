mod app;
mod cli;
mod commands;
mod config;
mod prompt;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{DevApp, LiveApp};
use crate::config::RosterConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RosterConfig::load()?;
    init_tracing(&config.log_level);

    if let Commands::ConfigPath = cli.command {
        return commands::config_path();
    }

    if cli.dev {
        tracing::info!("Using seeded in-memory data");
        let app = DevApp::dev(config.locale).await?;
        commands::run(&app, cli.command).await
    } else {
        let app = LiveApp::from_config(&config)?;
        commands::run(&app, cli.command).await
    }
}

/// RUST_LOG wins over the configured level. Logs go to stderr.
fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
