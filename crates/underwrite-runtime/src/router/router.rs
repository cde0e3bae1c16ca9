//! Tree traversal

use super::condition::{evaluate_condition, evaluate_gate};
use super::tree::{DecisionTree, NodeId};
use crate::error::{ConfigurationError, Result};
use crate::result::RoutingResult;
use std::collections::BTreeMap;
use underwrite_core::{DecisionTreeNode, NodeKind, RoutingContext};

impl DecisionTree {
    /// Route a context from the root to a terminal.
    ///
    /// Pure: no I/O and no state beyond the arguments, so the same context
    /// always yields the same result, path order included.
    pub fn route(&self, context: &RoutingContext) -> Result<RoutingResult> {
        let mut visited = vec![false; self.len()];
        let mut path = Vec::new();
        let mut current: NodeId = self.root();

        loop {
            let node = self.node(current);
            if std::mem::replace(&mut visited[current], true) {
                return Err(ConfigurationError::Cycle(node.node_key.clone()));
            }

            let step = match &node.kind {
                NodeKind::Strategy {
                    strategy_id,
                    params,
                } => {
                    tracing::debug!(node = %node.node_key, strategy = %strategy_id, "Reached strategy");
                    return Ok(RoutingResult {
                        strategy_id: Some(strategy_id.clone()),
                        assessment_id: None,
                        strategy_params: params.clone(),
                        terminal_node: Some(node.node_key.clone()),
                        used_default_strategy: false,
                        path,
                    });
                }
                NodeKind::Assessment { assessment_id } => {
                    tracing::debug!(node = %node.node_key, assessment = %assessment_id, "Reached assessment");
                    return Ok(RoutingResult {
                        strategy_id: None,
                        assessment_id: Some(assessment_id.clone()),
                        strategy_params: BTreeMap::new(),
                        terminal_node: Some(node.node_key.clone()),
                        used_default_strategy: false,
                        path,
                    });
                }
                NodeKind::Annotation { .. } => {
                    current = self.pass_through(current)?;
                    continue;
                }
                NodeKind::Condition(spec) => evaluate_condition(&node.node_key, spec, context),
                NodeKind::ScorecardGate {
                    attribute,
                    branches,
                    null_branch,
                } => evaluate_gate(
                    &node.node_key,
                    attribute,
                    branches,
                    null_branch.as_deref(),
                    context,
                ),
            };

            let branch = step.branch_taken.clone();
            path.push(step);

            match self.child_for(current, &branch) {
                Some(child) => current = child,
                None => return self.fall_back(node, &branch, path),
            }
        }
    }

    fn pass_through(&self, id: NodeId) -> Result<NodeId> {
        match self.children(id) {
            [child] => Ok(*child),
            _ => Err(ConfigurationError::InvalidNode {
                node: self.node(id).node_key.clone(),
                message: "annotation must have exactly one child".to_string(),
            }),
        }
    }

    fn fall_back(
        &self,
        node: &DecisionTreeNode,
        branch: &str,
        path: Vec<crate::result::PathStep>,
    ) -> Result<RoutingResult> {
        let Some(default) = self.default_strategy() else {
            return Err(ConfigurationError::DanglingBranch {
                node: node.node_key.clone(),
                branch: branch.to_string(),
            });
        };

        tracing::warn!(
            "Node '{}' has no child for branch '{}', using default strategy '{}'",
            node.node_key,
            branch,
            default
        );

        Ok(RoutingResult {
            strategy_id: Some(default.to_string()),
            assessment_id: None,
            strategy_params: BTreeMap::new(),
            terminal_node: None,
            used_default_strategy: true,
            path,
        })
    }
}

/// Stateless router over a flat node list
pub struct TreeRouter;

impl TreeRouter {
    /// Build the tree and route one context through it
    pub fn route(
        context: &RoutingContext,
        nodes: &[DecisionTreeNode],
        default_strategy: Option<&str>,
    ) -> Result<RoutingResult> {
        DecisionTree::from_nodes(nodes, default_strategy)?.route(context)
    }
}
