//! Builder pattern for DecisionEngine

use crate::champion::ChampionChallenger;
use crate::config::{EngineConfig, ReplayOptions};
use crate::decision_engine::loader::ConfigLoader;
use crate::decision_engine::{DecisionConfig, DecisionEngine};
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use underwrite_runtime::Scorecard;

/// Builder for DecisionEngine
///
/// # Example
///
/// ```rust,ignore
/// use underwrite_sdk::DecisionEngineBuilder;
///
/// // From bundle files
/// let engine = DecisionEngineBuilder::new()
///     .add_config_file("bundles/consumer.yaml")
///     .with_tree("consumer_v3")
///     .build()?;
///
/// // Inline content (tests, embedding)
/// let engine = DecisionEngineBuilder::new()
///     .add_config_content("consumer", yaml_content)
///     .with_scorecard(Arc::new(FixedScore(Some(700.0))))
///     .build()?;
/// ```
pub struct DecisionEngineBuilder {
    config: EngineConfig,
    scorecard: Option<Arc<dyn Scorecard>>,
    champion_challenger: Option<ChampionChallenger>,
}

impl DecisionEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            scorecard: None,
            champion_challenger: None,
        }
    }

    /// Start from an existing engine configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a bundle file
    pub fn add_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_files.push(path.into());
        self
    }

    /// Add bundle content
    pub fn add_config_content(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.config.config_contents.push((id.into(), content.into()));
        self
    }

    pub fn with_tree(mut self, tree_id: impl Into<String>) -> Self {
        self.config.tree_id = Some(tree_id.into());
        self
    }

    pub fn with_default_strategy(mut self, strategy_id: impl Into<String>) -> Self {
        self.config.default_strategy = Some(strategy_id.into());
        self
    }

    /// Scorecard used for cutoffs and gates. Defaults to the application's
    /// precomputed `application_score`.
    pub fn with_scorecard(mut self, scorecard: Arc<dyn Scorecard>) -> Self {
        self.scorecard = Some(scorecard);
        self
    }

    pub fn with_champion_challenger(mut self, split: ChampionChallenger) -> Self {
        self.champion_challenger = Some(split);
        self
    }

    pub fn with_replay_options(mut self, options: ReplayOptions) -> Self {
        self.config.replay = options;
        self
    }

    /// Load and validate the configuration without building an engine
    pub fn load_config(&self) -> Result<DecisionConfig> {
        ConfigLoader::load(&self.config)
    }

    /// Build the engine
    pub fn build(self) -> Result<DecisionEngine> {
        let config = self.load_config()?;

        let mut engine = DecisionEngine::new(config).with_replay_options(self.config.replay);
        if let Some(scorecard) = self.scorecard {
            engine = engine.with_scorecard(scorecard);
        }
        if let Some(split) = self.champion_challenger {
            engine = engine.with_champion_challenger(split)?;
        }

        tracing::info!(
            tree = engine.config().tree_id().unwrap_or("-"),
            rules = engine.config().catalog().len(),
            "Decision engine ready"
        );

        Ok(engine)
    }
}

impl Default for DecisionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
