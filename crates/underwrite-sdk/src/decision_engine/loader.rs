//! Configuration loading

use super::decision_config::DecisionConfig;
use crate::config::EngineConfig;
use crate::error::{Result, SdkError};
use std::path::Path;
use underwrite_parser::{BundleParser, ConfigBundle};

/// Loads bundle files and inline contents into a `DecisionConfig`
pub(crate) struct ConfigLoader;

impl ConfigLoader {
    pub(crate) fn load(config: &EngineConfig) -> Result<DecisionConfig> {
        let mut bundle = ConfigBundle::default();

        for path in &config.config_files {
            bundle.merge(Self::load_file(path)?)?;
        }

        for (id, content) in &config.config_contents {
            let parsed = BundleParser::parse(content)?;
            tracing::debug!("Loaded configuration content '{}'", id);
            bundle.merge(parsed)?;
        }

        if bundle.is_empty() {
            return Err(SdkError::ConfigError(
                "No configuration documents loaded".to_string(),
            ));
        }

        DecisionConfig::from_bundle(
            bundle,
            config.tree_id.as_deref(),
            config.default_strategy.as_deref(),
        )
    }

    fn load_file(path: &Path) -> Result<ConfigBundle> {
        let content = std::fs::read_to_string(path)?;
        let bundle = BundleParser::parse(&content)?;
        tracing::info!(
            "Loaded {} tree(s), {} strategy(ies), {} assessment(s) from {}",
            bundle.trees.len(),
            bundle.strategies.len(),
            bundle.assessments.len(),
            path.display()
        );
        Ok(bundle)
    }
}
