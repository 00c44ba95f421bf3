//! Implementation of the `promptloop config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
    pub worker_pool_size: usize,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        let yaml = serde_yaml::to_string(&self.config)
            .unwrap_or_else(|e| format!("<failed to render configuration: {e}>"));
        format!(
            "{}\n# effective worker pool size: {}",
            yaml.trim_end(),
            self.worker_pool_size
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Print the configuration after every source has been merged and validated.
pub fn execute(config: Config, json_mode: bool) -> Result<()> {
    let worker_pool_size = config.pipeline.worker_pool_size();
    output(
        &ConfigOutput {
            config,
            worker_pool_size,
        },
        json_mode,
    );
    Ok(())
}
