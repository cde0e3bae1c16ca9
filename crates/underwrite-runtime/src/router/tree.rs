//! Decision tree arena
//!
//! Nodes arrive as a flat list linked by `parent_node_id` + `branch_label`.
//! `DecisionTree::build` turns them into an index-addressed arena with a
//! parent -> children index and validates the structure once, so routing
//! never meets an unknown attribute or a malformed node.

use crate::error::{ConfigurationError, Result};
use std::collections::{BTreeSet, HashMap, VecDeque};
use underwrite_core::{
    ConditionSpec, ConditionType, DecisionTreeNode, NodeKind, RoutingAttribute,
};

/// Index of a node in the arena
pub type NodeId = usize;

/// Validated decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<DecisionTreeNode>,
    index: HashMap<String, NodeId>,
    children: Vec<Vec<NodeId>>,
    root: NodeId,
    default_strategy: Option<String>,
}

impl DecisionTree {
    /// Build and validate a tree
    pub fn build(nodes: Vec<DecisionTreeNode>, default_strategy: Option<String>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ConfigurationError::EmptyTree);
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (id, node) in nodes.iter().enumerate() {
            if index.insert(node.node_key.clone(), id).is_some() {
                return Err(ConfigurationError::DuplicateNode(node.node_key.clone()));
            }
        }

        let mut parents: Vec<Option<NodeId>> = Vec::with_capacity(nodes.len());
        let mut children = vec![Vec::new(); nodes.len()];
        for (id, node) in nodes.iter().enumerate() {
            let parent = match &node.parent_node_id {
                Some(parent_key) => {
                    let parent = *index.get(parent_key).ok_or_else(|| {
                        ConfigurationError::UnknownParent {
                            node: node.node_key.clone(),
                            parent: parent_key.clone(),
                        }
                    })?;
                    children[parent].push(id);
                    Some(parent)
                }
                None => None,
            };
            parents.push(parent);
        }

        let root = find_root(&nodes, &parents)?;
        detect_parent_cycles(&nodes, &parents)?;

        let default_strategy = default_strategy.filter(|s| !s.trim().is_empty());
        let tree = Self {
            nodes,
            index,
            children,
            root,
            default_strategy,
        };

        for id in 0..tree.nodes.len() {
            tree.validate_node(id)?;
        }
        tree.warn_unreachable();

        tracing::debug!(
            nodes = tree.nodes.len(),
            root = %tree.nodes[tree.root].node_key,
            "Decision tree built"
        );

        Ok(tree)
    }

    /// Build from borrowed nodes
    pub fn from_nodes(nodes: &[DecisionTreeNode], default_strategy: Option<&str>) -> Result<Self> {
        Self::build(nodes.to_vec(), default_strategy.map(str::to_string))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &DecisionTreeNode {
        &self.nodes[id]
    }

    pub fn get(&self, node_key: &str) -> Option<&DecisionTreeNode> {
        self.index.get(node_key).map(|&id| &self.nodes[id])
    }

    pub fn nodes(&self) -> &[DecisionTreeNode] {
        &self.nodes
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn default_strategy(&self) -> Option<&str> {
        self.default_strategy.as_deref()
    }

    /// Child reached through `label`: exact label match first, then
    /// case-insensitive
    pub fn child_for(&self, id: NodeId, label: &str) -> Option<NodeId> {
        let children = &self.children[id];
        let label_of = |child: &NodeId| self.nodes[*child].branch_label.as_deref();

        children
            .iter()
            .find(|child| label_of(child) == Some(label))
            .or_else(|| {
                children.iter().find(|child| {
                    label_of(child).is_some_and(|l| l.trim().eq_ignore_ascii_case(label.trim()))
                })
            })
            .copied()
    }

    /// Strategy ids referenced by terminals and the tree default
    pub fn strategy_refs(&self) -> BTreeSet<&str> {
        let mut refs: BTreeSet<&str> = self
            .nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Strategy { strategy_id, .. } => Some(strategy_id.as_str()),
                _ => None,
            })
            .collect();
        if let Some(default) = &self.default_strategy {
            refs.insert(default.as_str());
        }
        refs
    }

    /// Assessment ids referenced by terminals
    pub fn assessment_refs(&self) -> BTreeSet<&str> {
        self.nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Assessment { assessment_id } => Some(assessment_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Check every terminal reference against the known strategies and
    /// assessments
    pub fn check_references<S, A>(&self, has_strategy: S, has_assessment: A) -> Result<()>
    where
        S: Fn(&str) -> bool,
        A: Fn(&str) -> bool,
    {
        if let Some(missing) = self.strategy_refs().into_iter().find(|id| !has_strategy(id)) {
            return Err(ConfigurationError::UnknownStrategy(missing.to_string()));
        }
        if let Some(missing) = self.assessment_refs().into_iter().find(|id| !has_assessment(id)) {
            return Err(ConfigurationError::UnknownAssessment(missing.to_string()));
        }
        Ok(())
    }

    fn validate_node(&self, id: NodeId) -> Result<()> {
        let node = &self.nodes[id];
        let invalid = |message: &str| ConfigurationError::InvalidNode {
            node: node.node_key.clone(),
            message: message.to_string(),
        };

        match &node.kind {
            NodeKind::Condition(spec) => {
                self.validate_condition(node, spec)?;
                self.check_branches_resolve(id, spec.branches.iter().map(|b| b.label.as_str()))?;
            }
            NodeKind::ScorecardGate {
                attribute,
                branches,
                ..
            } => {
                self.check_attribute(node, attribute)?;
                if branches.is_empty() {
                    return Err(invalid("scorecard gate needs at least one branch"));
                }
                self.check_branches_resolve(id, branches.iter().map(|b| b.label.as_str()))?;
            }
            NodeKind::Strategy { strategy_id: target, .. }
            | NodeKind::Assessment {
                assessment_id: target,
            } => {
                if target.trim().is_empty() {
                    return Err(ConfigurationError::InvalidTerminal {
                        node: node.node_key.clone(),
                        message: "missing strategy or assessment reference".to_string(),
                    });
                }
                if !self.children[id].is_empty() {
                    return Err(ConfigurationError::InvalidTerminal {
                        node: node.node_key.clone(),
                        message: "terminal node cannot have children".to_string(),
                    });
                }
            }
            NodeKind::Annotation { .. } => {
                if self.children[id].len() != 1 {
                    return Err(invalid("annotation node needs exactly one child"));
                }
            }
        }

        Ok(())
    }

    fn validate_condition(&self, node: &DecisionTreeNode, spec: &ConditionSpec) -> Result<()> {
        let invalid = |message: String| ConfigurationError::InvalidNode {
            node: node.node_key.clone(),
            message,
        };
        let attribute = || {
            spec.attribute
                .as_deref()
                .ok_or_else(|| invalid(format!("{} node needs an attribute", spec.condition_type)))
        };

        match spec.condition_type {
            ConditionType::Binary => {
                self.check_attribute(node, attribute()?)?;
                if spec.operator.is_none() {
                    return Err(invalid("binary node needs an operator".to_string()));
                }
                if spec.branches.len() != 2 {
                    return Err(invalid("binary node needs exactly two branches".to_string()));
                }
                if spec.branches[0].threshold.is_none() {
                    return Err(invalid(
                        "binary node needs a threshold on its first branch".to_string(),
                    ));
                }
            }
            ConditionType::Compound => {
                if spec.compound_conditions.is_empty() {
                    return Err(invalid("compound node needs at least one condition".to_string()));
                }
                for condition in &spec.compound_conditions {
                    self.check_attribute(node, &condition.attribute)?;
                }
                if spec.branches.len() != 2 {
                    return Err(invalid("compound node needs exactly two branches".to_string()));
                }
            }
            ConditionType::Categorical
            | ConditionType::NumericRange
            | ConditionType::ScorecardGate => {
                self.check_attribute(node, attribute()?)?;
                if spec.branches.is_empty() {
                    return Err(invalid(format!(
                        "{} node needs at least one branch",
                        spec.condition_type
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_attribute(&self, node: &DecisionTreeNode, attribute: &str) -> Result<()> {
        if RoutingAttribute::from_name(attribute).is_none() {
            return Err(ConfigurationError::UnknownAttribute {
                node: node.node_key.clone(),
                attribute: attribute.to_string(),
            });
        }
        Ok(())
    }

    /// Every declared branch needs a child unless the tree has a default
    fn check_branches_resolve<'a>(
        &self,
        id: NodeId,
        labels: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        if self.default_strategy.is_some() {
            return Ok(());
        }
        for label in labels {
            if self.child_for(id, label).is_none() {
                return Err(ConfigurationError::DanglingBranch {
                    node: self.nodes[id].node_key.clone(),
                    branch: label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Breadth-first walk from the root; nodes never reached are reported
    fn warn_unreachable(&self) {
        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        queue.push_back(self.root);

        while let Some(id) = queue.pop_front() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            for &child in &self.children[id] {
                if !visited[child] {
                    queue.push_back(child);
                }
            }
        }

        for (id, seen) in visited.iter().enumerate() {
            if !seen {
                tracing::warn!(
                    "Node '{}' is not reachable from the root",
                    self.nodes[id].node_key
                );
            }
        }
    }
}

/// The `is_root` node, or failing that the unique parentless node
fn find_root(nodes: &[DecisionTreeNode], parents: &[Option<NodeId>]) -> Result<NodeId> {
    let flagged: Vec<NodeId> = (0..nodes.len()).filter(|&id| nodes[id].is_root).collect();
    match flagged.as_slice() {
        [root] => return Ok(*root),
        [] => {}
        _ => {
            return Err(ConfigurationError::MultipleRoots(
                flagged.iter().map(|&id| nodes[id].node_key.clone()).collect(),
            ))
        }
    }

    let parentless: Vec<NodeId> = (0..nodes.len()).filter(|&id| parents[id].is_none()).collect();
    match parentless.as_slice() {
        [root] => Ok(*root),
        [] => Err(ConfigurationError::NoRoot),
        _ => Err(ConfigurationError::MultipleRoots(
            parentless.iter().map(|&id| nodes[id].node_key.clone()).collect(),
        )),
    }
}

/// Follow parent links from every node; a link back into the current chain
/// is a cycle
fn detect_parent_cycles(nodes: &[DecisionTreeNode], parents: &[Option<NodeId>]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InChain,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut chain = Vec::new();

    for start in 0..nodes.len() {
        let mut current = Some(start);
        while let Some(id) = current {
            match marks[id] {
                Mark::Done => break,
                Mark::InChain => return Err(ConfigurationError::Cycle(nodes[id].node_key.clone())),
                Mark::Unvisited => {
                    marks[id] = Mark::InChain;
                    chain.push(id);
                    current = parents[id];
                }
            }
        }
        for id in chain.drain(..) {
            marks[id] = Mark::Done;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use underwrite_core::{Branch, ComparisonOperator};

    fn binary_root() -> DecisionTreeNode {
        DecisionTreeNode::condition(
            "root",
            ConditionSpec::binary(
                "is_existing_customer",
                ComparisonOperator::Eq,
                true,
                "Yes",
                "No",
            ),
        )
        .root()
    }

    fn two_leaf_tree() -> Vec<DecisionTreeNode> {
        vec![
            binary_root(),
            DecisionTreeNode::strategy("existing", "repeat").child_of("root", "Yes"),
            DecisionTreeNode::strategy("new", "standard").child_of("root", "No"),
        ]
    }

    #[test]
    fn test_build_valid_tree() {
        let tree = DecisionTree::build(two_leaf_tree(), None).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(tree.root()).node_key, "root");
        assert_eq!(tree.children(tree.root()).len(), 2);
        assert_eq!(tree.strategy_refs().into_iter().collect::<Vec<_>>(), vec!["repeat", "standard"]);
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(
            DecisionTree::build(Vec::new(), None).unwrap_err(),
            ConfigurationError::EmptyTree
        );
    }

    #[test]
    fn test_duplicate_keys() {
        let mut nodes = two_leaf_tree();
        nodes.push(DecisionTreeNode::strategy("new", "other"));
        assert_eq!(
            DecisionTree::build(nodes, None).unwrap_err(),
            ConfigurationError::DuplicateNode("new".to_string())
        );
    }

    #[test]
    fn test_root_fallback_to_parentless() {
        let mut nodes = two_leaf_tree();
        nodes[0].is_root = false;
        let tree = DecisionTree::build(nodes, None).unwrap();
        assert_eq!(tree.node(tree.root()).node_key, "root");
    }

    #[test]
    fn test_multiple_roots() {
        let mut nodes = two_leaf_tree();
        nodes[1].is_root = true;
        assert!(matches!(
            DecisionTree::build(nodes, None),
            Err(ConfigurationError::MultipleRoots(_))
        ));
    }

    #[test]
    fn test_no_root_when_every_node_has_parent() {
        let nodes = vec![
            DecisionTreeNode::annotation("a", "loop").child_of("b", "x"),
            DecisionTreeNode::annotation("b", "loop").child_of("a", "x"),
        ];
        assert_eq!(DecisionTree::build(nodes, None).unwrap_err(), ConfigurationError::NoRoot);
    }

    #[test]
    fn test_parent_cycle_detected() {
        let nodes = vec![
            DecisionTreeNode::annotation("root", "start").root().child_of("b", "x"),
            DecisionTreeNode::annotation("a", "loop").child_of("root", "x"),
            DecisionTreeNode::annotation("b", "loop").child_of("a", "x"),
        ];
        assert!(matches!(
            DecisionTree::build(nodes, None),
            Err(ConfigurationError::Cycle(_))
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let mut nodes = two_leaf_tree();
        nodes.push(DecisionTreeNode::strategy("orphan", "s").child_of("ghost", "x"));
        assert_eq!(
            DecisionTree::build(nodes, None).unwrap_err(),
            ConfigurationError::UnknownParent {
                node: "orphan".to_string(),
                parent: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_attribute_fails_at_load() {
        let nodes = vec![
            DecisionTreeNode::condition(
                "root",
                ConditionSpec::categorical("favourite_colour", vec![Branch::new("Other")]),
            )
            .root(),
            DecisionTreeNode::strategy("leaf", "s").child_of("root", "Other"),
        ];
        assert!(matches!(
            DecisionTree::build(nodes, None),
            Err(ConfigurationError::UnknownAttribute { attribute, .. }) if attribute == "favourite_colour"
        ));
    }

    #[test]
    fn test_dangling_branch_without_default() {
        let nodes = vec![
            binary_root(),
            DecisionTreeNode::strategy("existing", "repeat").child_of("root", "Yes"),
        ];
        assert_eq!(
            DecisionTree::build(nodes.clone(), None).unwrap_err(),
            ConfigurationError::DanglingBranch {
                node: "root".to_string(),
                branch: "No".to_string()
            }
        );
        assert!(DecisionTree::build(nodes, Some("standard".to_string())).is_ok());
    }

    #[test]
    fn test_terminal_without_reference() {
        let nodes = vec![DecisionTreeNode::strategy("only", " ").root()];
        assert!(matches!(
            DecisionTree::build(nodes, None),
            Err(ConfigurationError::InvalidTerminal { .. })
        ));
    }

    #[test]
    fn test_annotation_needs_one_child() {
        let nodes = vec![DecisionTreeNode::annotation("note", "empty").root()];
        assert!(matches!(
            DecisionTree::build(nodes, None),
            Err(ConfigurationError::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_binary_arity() {
        let mut spec =
            ConditionSpec::binary("bureau_score", ComparisonOperator::Gte, 700.0, "High", "Low");
        spec.branches.push(Branch::new("Extra"));
        let nodes = vec![DecisionTreeNode::condition("root", spec).root()];
        assert!(matches!(
            DecisionTree::build(nodes, Some("s".to_string())),
            Err(ConfigurationError::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_child_lookup_case_insensitive() {
        let nodes = vec![
            binary_root(),
            DecisionTreeNode::strategy("existing", "repeat").child_of("root", "yes"),
            DecisionTreeNode::strategy("new", "standard").child_of("root", "No"),
        ];
        let tree = DecisionTree::build(nodes, None).unwrap();
        let child = tree.child_for(tree.root(), "Yes").unwrap();
        assert_eq!(tree.node(child).node_key, "existing");
    }

    #[test]
    fn test_check_references() {
        let tree = DecisionTree::build(two_leaf_tree(), None).unwrap();
        assert!(tree.check_references(|_| true, |_| true).is_ok());
        assert_eq!(
            tree.check_references(|id| id == "repeat", |_| true).unwrap_err(),
            ConfigurationError::UnknownStrategy("standard".to_string())
        );
    }
}
