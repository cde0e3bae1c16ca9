//! Validated configuration snapshot
//!
//! One catalog, one tree and every strategy/assessment the tree can reach,
//! checked against each other once so a decision never meets a dangling
//! reference.

use crate::error::{Result, SdkError};
use std::collections::BTreeMap;
use underwrite_core::{Assessment, Strategy};
use underwrite_parser::{BundleParser, ConfigBundle, TreeSpec};
use underwrite_runtime::{default_rules, DecisionTree, RuleCatalog, StrategyExecutor};

/// Immutable, version-pinned configuration a decision runs against
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    catalog: RuleCatalog,
    tree: DecisionTree,
    tree_id: Option<String>,
    strategies: BTreeMap<String, Strategy>,
    assessments: BTreeMap<String, Assessment>,
}

impl DecisionConfig {
    /// Assemble and cross-check a configuration
    pub fn new(
        catalog: RuleCatalog,
        tree: DecisionTree,
        strategies: Vec<Strategy>,
        assessments: Vec<Assessment>,
    ) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for strategy in strategies {
            StrategyExecutor::validate_strategy(&strategy)?;
            let id = strategy.id.clone();
            if by_id.insert(id.clone(), strategy).is_some() {
                return Err(SdkError::ConfigError(format!("Duplicate strategy id: {}", id)));
            }
        }

        let mut assessment_by_id = BTreeMap::new();
        for assessment in assessments {
            StrategyExecutor::validate_assessment(&assessment)?;
            let id = assessment.id.clone();
            if assessment_by_id.insert(id.clone(), assessment).is_some() {
                return Err(SdkError::ConfigError(format!("Duplicate assessment id: {}", id)));
            }
        }

        tree.check_references(
            |id| by_id.contains_key(id),
            |id| assessment_by_id.contains_key(id),
        )?;

        Ok(Self {
            catalog,
            tree,
            tree_id: None,
            strategies: by_id,
            assessments: assessment_by_id,
        })
    }

    /// Build from a parsed bundle.
    ///
    /// `tree_id` selects a tree when the bundle holds several;
    /// `default_strategy` replaces the tree's own default.
    pub fn from_bundle(
        bundle: ConfigBundle,
        tree_id: Option<&str>,
        default_strategy: Option<&str>,
    ) -> Result<Self> {
        let catalog = match bundle.catalog {
            Some(spec) => RuleCatalog::resolve(default_rules(), &spec.overrides, spec.custom)?,
            None => RuleCatalog::defaults(),
        };

        let spec = select_tree(bundle.trees, tree_id)?;
        let default = default_strategy
            .map(str::to_string)
            .or(spec.default_strategy);
        let tree = DecisionTree::build(spec.nodes, default)?;

        tracing::debug!(
            tree = %spec.id,
            version = spec.version,
            strategies = bundle.strategies.len(),
            assessments = bundle.assessments.len(),
            rules = catalog.len(),
            "Decision configuration assembled"
        );

        let mut config = Self::new(catalog, tree, bundle.strategies, bundle.assessments)?;
        config.tree_id = Some(spec.id);
        Ok(config)
    }

    /// Parse a bundle and build from it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_bundle(BundleParser::parse(yaml)?, None, None)
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Id of the tree, when built from a bundle
    pub fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    pub fn strategy(&self, id: &str) -> Option<&Strategy> {
        self.strategies.get(id)
    }

    pub fn assessment(&self, id: &str) -> Option<&Assessment> {
        self.assessments.get(id)
    }

    pub fn strategies(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    pub fn assessments(&self) -> impl Iterator<Item = &Assessment> {
        self.assessments.values()
    }
}

fn select_tree(trees: Vec<TreeSpec>, tree_id: Option<&str>) -> Result<TreeSpec> {
    if let Some(id) = tree_id {
        return trees
            .into_iter()
            .find(|tree| tree.id == id)
            .ok_or_else(|| SdkError::ConfigError(format!("Decision tree not found: {}", id)));
    }

    let count = trees.len();
    let mut trees = trees.into_iter();
    match (trees.next(), count) {
        (Some(tree), 1) => Ok(tree),
        (None, _) => Err(SdkError::ConfigError(
            "Configuration has no decision tree".to_string(),
        )),
        (Some(first), _) => {
            let ids: Vec<String> = std::iter::once(first.id)
                .chain(trees.map(|tree| tree.id))
                .collect();
            Err(SdkError::ConfigError(format!(
                "Configuration has {} decision trees ({}); select one by id",
                count,
                ids.join(", ")
            )))
        }
    }
}
