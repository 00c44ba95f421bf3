//! Promptloop CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use promptloop::cli::commands;
use promptloop::cli::{Cli, Commands};
use promptloop::domain::models::{Config, LoggingConfig};
use promptloop::infrastructure::config::ConfigLoader;
use promptloop::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = dispatch(cli).await {
        promptloop::cli::handle_error(err, json_mode);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init(args) => {
            let _logger = init_logging(&LoggingConfig::default())?;
            commands::init::execute(args, cli.json).await
        }
        Commands::Run(args) => {
            let config = load_config(cli.config.as_deref())?;
            let _logger = init_logging(&config.logging)?;
            commands::run::execute(args, config, cli.json).await
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            let _logger = init_logging(&config.logging)?;
            commands::config::execute(config, cli.json)
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    ConfigLoader::load(explicit).context("Failed to load configuration")
}

fn init_logging(logging: &LoggingConfig) -> Result<LoggerImpl> {
    let log_config = LogConfig::try_from(logging).context("Invalid logging configuration")?;
    LoggerImpl::init(&log_config)
}
