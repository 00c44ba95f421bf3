//! Implementation of the `promptloop init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.success {
            lines.push(format!("\nConfiguration written to {}", self.config_path.display()));
            lines.push(
                "Set OPENROUTER_API_KEY (or the variable named by backend.api_key_env) before running."
                    .to_string(),
            );
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let result = write_default_config(&args.path, args.force).await?;
    output(&result, json_mode);
    Ok(())
}

/// Write the default configuration under `root`, leaving an existing file
/// alone unless `force` is set.
pub async fn write_default_config(root: &Path, force: bool) -> Result<InitOutput> {
    let config_dir = root.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        return Ok(InitOutput {
            success: false,
            message: "Configuration already exists. Use --force to overwrite.".to_string(),
            config_path,
        });
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default())
        .context("Failed to serialize default configuration")?;
    let contents = format!(
        "# promptloop configuration\n\
         # Overrides: .promptloop/local.yaml, PROMPTLOOP_* env vars (PROMPTLOOP_PIPELINE__MAX_ITERATIONS=3), --config FILE\n\
         {yaml}"
    );
    fs::write(&config_path, contents)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    Ok(InitOutput {
        success: true,
        message: if force {
            "Configuration reinitialized.".to_string()
        } else {
            "Configuration initialized.".to_string()
        },
        config_path,
    })
}
