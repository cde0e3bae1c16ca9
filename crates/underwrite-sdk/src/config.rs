//! Configuration types for DecisionEngine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Configuration bundle file path(s): catalog, trees, strategies,
    /// assessments
    #[serde(default)]
    pub config_files: Vec<PathBuf>,

    /// Bundle contents (id, content) - alternative to file paths
    #[serde(skip)]
    pub config_contents: Vec<(String, String)>,

    /// Tree to route with when the bundle holds more than one
    #[serde(default)]
    pub tree_id: Option<String>,

    /// Replaces the tree's own default strategy
    #[serde(default)]
    pub default_strategy: Option<String>,

    /// Batch replay options
    #[serde(default)]
    pub replay: ReplayOptions,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            config_files: Vec::new(),
            config_contents: Vec::new(),
            tree_id: None,
            default_strategy: None,
            replay: ReplayOptions::default(),
        }
    }

    /// Add a bundle file
    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_files.push(path);
        self
    }

    /// Add bundle content
    pub fn with_config_content(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.config_contents.push((id.into(), content.into()));
        self
    }

    /// Select a tree by id
    pub fn with_tree(mut self, tree_id: impl Into<String>) -> Self {
        self.tree_id = Some(tree_id.into());
        self
    }

    /// Override the tree default strategy
    pub fn with_default_strategy(mut self, strategy_id: impl Into<String>) -> Self {
        self.default_strategy = Some(strategy_id.into());
        self
    }

    /// Set replay options
    pub fn with_replay(mut self, replay: ReplayOptions) -> Self {
        self.replay = replay;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay and impact analysis options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayOptions {
    /// Evaluate applications in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Largest batch a single replay accepts
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_parallel() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    50_000
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl ReplayOptions {
    /// Sequential evaluation
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }
}
