//! Decision tree parser
//!
//! Parses a `tree:` document into a flat node list. Structural validation
//! (roots, cycles, dangling branches) belongs to the runtime, which builds
//! the node arena; this parser only checks the shape of each node.

use crate::error::{ParseError, Result};
use crate::rule_parser::parse_operator;
use crate::yaml_parser::YamlParser;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use underwrite_core::{
    Branch, CompoundCondition, CompoundLogic, ConditionSpec, ConditionType, DecisionTreeNode,
    NodeKind,
};

const TREE_FIELDS: &[&str] = &["id", "name", "version", "default_strategy", "nodes"];

const NODE_FIELDS: &[&str] = &[
    "key",
    "node_key",
    "name",
    "parent",
    "parent_node_id",
    "branch",
    "branch_label",
    "is_root",
    "type",
    "condition_type",
    "attribute",
    "operator",
    "branches",
    "compound_conditions",
    "compound_logic",
    "null_branch",
    "strategy_id",
    "params",
    "assessment_id",
    "note",
];

/// Parsed decision tree document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub version: u32,

    /// Strategy used when a resolved branch has no child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_strategy: Option<String>,

    pub nodes: Vec<DecisionTreeNode>,
}

/// Decision tree parser
pub struct TreeParser;

impl TreeParser {
    /// Parse a tree from a YAML string with a top-level `tree:` key
    pub fn parse(yaml_str: &str) -> Result<TreeSpec> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse a tree from a YAML document
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<TreeSpec> {
        let obj = yaml.get("tree").ok_or_else(|| ParseError::MissingField {
            field: "tree".to_string(),
        })?;
        Self::parse_tree(obj)
    }

    /// Parse the body of a `tree:` document
    pub fn parse_tree(obj: &YamlValue) -> Result<TreeSpec> {
        let id = YamlParser::get_string(obj, "id")?;
        YamlParser::validate_fields(obj, TREE_FIELDS, &format!("tree '{}'", id));

        let nodes = match YamlParser::get_optional_array(obj, "nodes") {
            Some(items) => items
                .iter()
                .map(Self::parse_node)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(TreeSpec {
            id,
            name: YamlParser::get_optional_string(obj, "name"),
            version: YamlParser::get_optional_u32(obj, "version")?.unwrap_or(1),
            default_strategy: YamlParser::get_optional_string(obj, "default_strategy"),
            nodes,
        })
    }

    /// Parse one node
    pub fn parse_node(obj: &YamlValue) -> Result<DecisionTreeNode> {
        let node_key = YamlParser::get_optional_string(obj, "key")
            .or_else(|| YamlParser::get_optional_string(obj, "node_key"))
            .ok_or_else(|| ParseError::MissingField {
                field: "key".to_string(),
            })?;
        YamlParser::validate_fields(obj, NODE_FIELDS, &format!("node '{}'", node_key));

        let node_type = YamlParser::get_optional_string(obj, "type").unwrap_or_else(|| {
            if obj.get("condition_type").is_some() {
                "condition".to_string()
            } else {
                String::new()
            }
        });

        let kind = match node_type.as_str() {
            "condition" => Self::parse_condition(&node_key, obj)?,
            "scorecard_gate" => Self::parse_gate(obj)?,
            "strategy" => NodeKind::Strategy {
                strategy_id: YamlParser::get_string(obj, "strategy_id")?,
                params: YamlParser::get_value_map(obj, "params")?,
            },
            "assessment" => NodeKind::Assessment {
                assessment_id: YamlParser::get_string(obj, "assessment_id")?,
            },
            "annotation" => NodeKind::Annotation {
                note: YamlParser::get_optional_string(obj, "note"),
            },
            "" => {
                return Err(ParseError::MissingField {
                    field: "type".to_string(),
                })
            }
            other => {
                return Err(ParseError::InvalidValue {
                    field: "type".to_string(),
                    message: format!("unknown node type '{}' on node '{}'", other, node_key),
                })
            }
        };

        Ok(DecisionTreeNode {
            node_key,
            name: YamlParser::get_optional_string(obj, "name"),
            parent_node_id: YamlParser::get_optional_string(obj, "parent")
                .or_else(|| YamlParser::get_optional_string(obj, "parent_node_id")),
            branch_label: YamlParser::get_optional_string(obj, "branch")
                .or_else(|| YamlParser::get_optional_string(obj, "branch_label")),
            is_root: YamlParser::get_optional_bool(obj, "is_root")?.unwrap_or(false),
            kind,
        })
    }

    fn parse_condition(node_key: &str, obj: &YamlValue) -> Result<NodeKind> {
        let condition_type = match YamlParser::get_string(obj, "condition_type")?.as_str() {
            "binary" => ConditionType::Binary,
            "categorical" => ConditionType::Categorical,
            "numeric_range" => ConditionType::NumericRange,
            "compound" => ConditionType::Compound,
            // a gate written as a condition is stored in its canonical form
            "scorecard_gate" => return Self::parse_gate(obj),
            other => {
                return Err(ParseError::InvalidValue {
                    field: "condition_type".to_string(),
                    message: format!("unknown condition type '{}' on node '{}'", other, node_key),
                })
            }
        };

        let operator = YamlParser::get_optional_string(obj, "operator")
            .map(|op| parse_operator(&op))
            .transpose()?;

        let compound_logic = match YamlParser::get_optional_string(obj, "compound_logic") {
            Some(s) => s
                .parse::<CompoundLogic>()
                .map_err(|e| ParseError::InvalidValue {
                    field: "compound_logic".to_string(),
                    message: e.to_string(),
                })?,
            None => CompoundLogic::And,
        };

        let compound_conditions = match YamlParser::get_optional_array(obj, "compound_conditions") {
            Some(items) => items
                .iter()
                .map(Self::parse_compound_condition)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(NodeKind::Condition(ConditionSpec {
            condition_type,
            attribute: YamlParser::get_optional_string(obj, "attribute"),
            operator,
            branches: Self::parse_branches(obj)?,
            compound_conditions,
            compound_logic,
            null_branch: YamlParser::get_optional_string(obj, "null_branch"),
        }))
    }

    fn parse_gate(obj: &YamlValue) -> Result<NodeKind> {
        Ok(NodeKind::ScorecardGate {
            attribute: YamlParser::get_string(obj, "attribute")?,
            branches: Self::parse_branches(obj)?,
            null_branch: YamlParser::get_optional_string(obj, "null_branch"),
        })
    }

    fn parse_branches(obj: &YamlValue) -> Result<Vec<Branch>> {
        let Some(items) = YamlParser::get_optional_array(obj, "branches") else {
            return Ok(Vec::new());
        };

        items
            .iter()
            .map(|item| {
                // a bare label is shorthand for a branch with no values
                if let Some(label) = item.as_str() {
                    return Ok(Branch::new(label));
                }

                let mut branch = Branch::new(YamlParser::get_string(item, "label")?);
                branch.values = match (item.get("values"), item.get("value")) {
                    (Some(YamlValue::Sequence(values)), _) => {
                        values.iter().map(YamlParser::to_value).collect()
                    }
                    (Some(single), _) | (None, Some(single)) => vec![YamlParser::to_value(single)],
                    (None, None) => Vec::new(),
                };
                branch.min = YamlParser::get_optional_f64(item, "min")?;
                branch.max = YamlParser::get_optional_f64(item, "max")?;
                branch.threshold = item.get("threshold").map(YamlParser::to_value);
                Ok(branch)
            })
            .collect()
    }

    fn parse_compound_condition(obj: &YamlValue) -> Result<CompoundCondition> {
        let attribute = YamlParser::get_string(obj, "attribute")?;
        let operator = parse_operator(&YamlParser::get_string(obj, "operator")?)?;
        let value = obj
            .get("value")
            .map(YamlParser::to_value)
            .ok_or_else(|| ParseError::MissingField {
                field: "value".to_string(),
            })?;

        Ok(CompoundCondition {
            attribute,
            operator,
            value,
        })
    }
}
