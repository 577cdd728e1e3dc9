//! glyph-operator CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use glyph_operator::cli::{commands, handle_error, Cli, Commands};
use glyph_operator::domain::models::Config;
use glyph_operator::infrastructure::config::ConfigLoader;
use glyph_operator::infrastructure::logging::{LogConfig, LoggerImpl};

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let command = match cli.command {
        Commands::Init(args) => return commands::init::execute(args, cli.json).await,
        other => other,
    };

    let config = load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Analyze(args) => commands::analyze::execute(args, &config, cli.json).await,
        Commands::Simulate(args) => commands::simulate::execute(args, &config, cli.json).await,
        Commands::Peaks(args) => commands::peaks::execute(args, &config, cli.json).await,
        Commands::Session(args) => commands::session::execute(args, &config, cli.json).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}
