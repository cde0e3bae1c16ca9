//! CLI configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use underwrite_sdk::ReplayOptions;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log format for stderr output
    pub log_format: LogFormat,

    /// Evaluate replay and impact batches in parallel
    pub parallel: bool,

    /// Largest batch a replay or impact run accepts
    pub max_batch_size: usize,

    /// Tree to route with when a bundle holds several
    pub tree_id: Option<String>,

    /// Replaces the tree's own default strategy
    pub default_strategy: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let replay = ReplayOptions::default();
        Self {
            log_format: LogFormat::Pretty,
            parallel: replay.parallel,
            max_batch_size: replay.max_batch_size,
            tree_id: None,
            default_strategy: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/underwrite").required(false))
            .add_source(config::Environment::with_prefix("UNDERWRITE").try_parsing(true))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::debug!("No usable config file ({}), using default configuration", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from one file, ignoring the environment
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))
    }

    pub fn replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            parallel: self.parallel,
            max_batch_size: self.max_batch_size,
        }
    }
}
