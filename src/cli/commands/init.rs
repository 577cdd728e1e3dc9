//! Implementation of the `glyph-operator init` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::display::{output, CommandOutput};
use crate::infrastructure::config::{ConfigLoader, CONFIG_DIR, CONFIG_FILE};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let dir = args.path.join(CONFIG_DIR);
    let config_path = dir.join(CONFIG_FILE);

    if fs::try_exists(&config_path).await.unwrap_or(false) && !args.force {
        output(
            &InitOutput {
                success: false,
                message: format!(
                    "{} already exists. Use --force to overwrite.",
                    config_path.display()
                ),
                config_path,
            },
            json_mode,
        );
        return Ok(());
    }

    fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let yaml = ConfigLoader::default_yaml()?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    output(
        &InitOutput {
            success: true,
            message: format!("Wrote default configuration to {}", config_path.display()),
            config_path,
        },
        json_mode,
    );
    Ok(())
}
