//! Rule parser
//!
//! Parses YAML rule definitions into `RuleDefinition` values.
//!
//! A rule is either flat (`field` / `operator` / `threshold`) or compound
//! (`logic` + `conditions`). A flat rule on a computed field becomes a
//! computed rule.

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use underwrite_core::{
    ComparisonOperator, CompoundLogic, ComputedField, RuleCondition, RuleDefinition, RuleField,
    RuleKind, RuleOutcome, RuleOverride, Severity, Threshold,
};

const RULE_FIELDS: &[&str] = &[
    "id",
    "name",
    "description",
    "field",
    "operator",
    "threshold",
    "severity",
    "outcome",
    "enabled",
    "is_custom",
    "logic",
    "conditions",
];

const OVERRIDE_FIELDS: &[&str] = &["threshold", "outcome", "severity", "enabled"];

/// Rule parser
pub struct RuleParser;

impl RuleParser {
    /// Parse a rule from a YAML string with a top-level `rule:` key
    pub fn parse(yaml_str: &str) -> Result<RuleDefinition> {
        let yaml = YamlParser::parse(yaml_str)?;
        let rule_obj = yaml.get("rule").ok_or_else(|| ParseError::MissingField {
            field: "rule".to_string(),
        })?;
        Self::parse_rule(rule_obj)
    }

    /// Parse a rule from a YAML object
    pub fn parse_rule(obj: &YamlValue) -> Result<RuleDefinition> {
        let id = YamlParser::get_string(obj, "id")?;
        YamlParser::validate_fields(obj, RULE_FIELDS, &format!("rule '{}'", id));

        let name = YamlParser::get_optional_string(obj, "name").unwrap_or_else(|| id.clone());
        let outcome = YamlParser::get_optional_string(obj, "outcome")
            .map(|s| parse_outcome(&s))
            .transpose()?;
        // Without an explicit severity a referring rule is a refer rule
        let severity = match YamlParser::get_optional_string(obj, "severity") {
            Some(s) => parse_severity(&s)?,
            None if outcome == Some(RuleOutcome::Refer) => Severity::Refer,
            None => Severity::Hard,
        };

        let kind = if obj.get("conditions").is_some() {
            Self::parse_compound(obj)?
        } else {
            Self::parse_single(obj)?
        };

        let mut rule = RuleDefinition::new(id, name, kind, severity);

        if let Some(description) = YamlParser::get_optional_string(obj, "description") {
            rule = rule.with_description(description);
        }
        if let Some(outcome) = outcome {
            rule = rule.with_outcome(outcome);
        }
        if let Some(enabled) = YamlParser::get_optional_bool(obj, "enabled")? {
            rule.enabled = enabled;
        }
        if let Some(is_custom) = YamlParser::get_optional_bool(obj, "is_custom")? {
            rule.is_custom = is_custom;
        }

        Ok(rule)
    }

    /// Parse a list of rules under `field`, returning an empty list if absent
    pub fn parse_rule_list(obj: &YamlValue, field: &str) -> Result<Vec<RuleDefinition>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(Vec::new()),
            Some(YamlValue::Sequence(items)) => items.iter().map(Self::parse_rule).collect(),
            Some(_) => Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a list of rules".to_string(),
            }),
        }
    }

    /// Parse a per-rule override
    pub fn parse_override(rule_id: &str, obj: &YamlValue) -> Result<RuleOverride> {
        YamlParser::validate_fields(obj, OVERRIDE_FIELDS, &format!("override '{}'", rule_id));

        let threshold = match obj.get("threshold") {
            None | Some(YamlValue::Null) => None,
            Some(value) => Some(parse_threshold(value)),
        };
        let outcome = YamlParser::get_optional_string(obj, "outcome")
            .map(|s| parse_outcome(&s))
            .transpose()?;
        let severity = YamlParser::get_optional_string(obj, "severity")
            .map(|s| parse_severity(&s))
            .transpose()?;
        let enabled = YamlParser::get_optional_bool(obj, "enabled")?;

        Ok(RuleOverride {
            threshold,
            outcome,
            severity,
            enabled,
        })
    }

    fn parse_single(obj: &YamlValue) -> Result<RuleKind> {
        let condition = Self::parse_condition(obj)?;

        let computed = RuleField::from_name(&condition.field)
            .filter(|field| field.is_computed())
            .and_then(ComputedField::from_field);

        Ok(match computed {
            Some(field) => RuleKind::Computed {
                field,
                operator: condition.operator,
                threshold: condition.threshold,
            },
            None => RuleKind::Threshold(condition),
        })
    }

    fn parse_compound(obj: &YamlValue) -> Result<RuleKind> {
        let logic = match YamlParser::get_optional_string(obj, "logic") {
            Some(s) => s
                .parse::<CompoundLogic>()
                .map_err(|e| ParseError::InvalidValue {
                    field: "logic".to_string(),
                    message: e.to_string(),
                })?,
            None => CompoundLogic::And,
        };

        let items = YamlParser::get_optional_array(obj, "conditions").ok_or_else(|| {
            ParseError::InvalidValue {
                field: "conditions".to_string(),
                message: "expected a list of conditions".to_string(),
            }
        })?;
        if items.is_empty() {
            return Err(ParseError::InvalidValue {
                field: "conditions".to_string(),
                message: "compound rule needs at least one condition".to_string(),
            });
        }

        let conditions = items
            .iter()
            .map(Self::parse_condition)
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleKind::Compound { logic, conditions })
    }

    fn parse_condition(obj: &YamlValue) -> Result<RuleCondition> {
        let field = YamlParser::get_string(obj, "field")?;
        let operator = parse_operator(&YamlParser::get_string(obj, "operator")?)?;
        let threshold = obj
            .get("threshold")
            .map(parse_threshold)
            .ok_or_else(|| ParseError::MissingField {
                field: "threshold".to_string(),
            })?;

        Ok(RuleCondition {
            field,
            operator,
            threshold,
        })
    }
}

/// Parse a comparison operator name or symbol
pub(crate) fn parse_operator(s: &str) -> Result<ComparisonOperator> {
    s.parse::<ComparisonOperator>()
        .map_err(|_| ParseError::InvalidOperator(s.to_string()))
}

/// `{min, max}` mapping → range, sequence → list, anything else → scalar
pub(crate) fn parse_threshold(value: &YamlValue) -> Threshold {
    if let (Some(min), Some(max)) = (
        value.get("min").and_then(YamlValue::as_f64),
        value.get("max").and_then(YamlValue::as_f64),
    ) {
        return Threshold::Range { min, max };
    }
    match value {
        YamlValue::Sequence(items) => {
            Threshold::List(items.iter().map(YamlParser::to_value).collect())
        }
        other => Threshold::Scalar(YamlParser::to_value(other)),
    }
}

fn parse_severity(s: &str) -> Result<Severity> {
    match s.trim().to_ascii_lowercase().as_str() {
        "hard" => Ok(Severity::Hard),
        "refer" | "soft" => Ok(Severity::Refer),
        other => Err(ParseError::InvalidValue {
            field: "severity".to_string(),
            message: format!("unknown severity '{}', expected hard or refer", other),
        }),
    }
}

fn parse_outcome(s: &str) -> Result<RuleOutcome> {
    match s.trim().to_ascii_lowercase().as_str() {
        "decline" => Ok(RuleOutcome::Decline),
        "refer" => Ok(RuleOutcome::Refer),
        "disable" | "disabled" => Ok(RuleOutcome::Disable),
        other => Err(ParseError::InvalidValue {
            field: "outcome".to_string(),
            message: format!("unknown outcome '{}', expected decline, refer or disable", other),
        }),
    }
}
