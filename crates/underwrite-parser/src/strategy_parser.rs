//! Strategy and assessment parsers

use crate::error::{ParseError, Result};
use crate::rule_parser::RuleParser;
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use underwrite_core::{Assessment, Decision, EvaluationMode, ScoreCutoff, ScoreGate, Strategy};

const STRATEGY_FIELDS: &[&str] = &[
    "id",
    "version",
    "name",
    "evaluation_mode",
    "knock_out_rules",
    "overlay_rules",
    "score_cutoffs",
    "reason_code_map",
    "score_gate",
];

const ASSESSMENT_FIELDS: &[&str] = &["id", "name", "rules"];

/// Strategy parser
pub struct StrategyParser;

impl StrategyParser {
    /// Parse a strategy from a YAML string with a top-level `strategy:` key
    pub fn parse(yaml_str: &str) -> Result<Strategy> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse a strategy from a YAML document
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<Strategy> {
        let obj = yaml.get("strategy").ok_or_else(|| ParseError::MissingField {
            field: "strategy".to_string(),
        })?;
        Self::parse_strategy(obj)
    }

    /// Parse the body of a `strategy:` document
    pub fn parse_strategy(obj: &YamlValue) -> Result<Strategy> {
        let id = YamlParser::get_string(obj, "id")?;
        YamlParser::validate_fields(obj, STRATEGY_FIELDS, &format!("strategy '{}'", id));

        let evaluation_mode = parse_mode(&YamlParser::get_string(obj, "evaluation_mode")?)?;

        let score_cutoffs = match YamlParser::get_optional_array(obj, "score_cutoffs") {
            Some(items) => items
                .iter()
                .map(parse_cutoff)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let score_gate = match obj.get("score_gate") {
            None | Some(YamlValue::Null) => None,
            Some(gate) => Some(ScoreGate {
                min_score: YamlParser::get_f64(gate, "min_score")?,
                fail_outcome: match YamlParser::get_optional_string(gate, "fail_outcome") {
                    Some(s) => parse_decision("fail_outcome", &s)?,
                    None => Decision::Decline,
                },
            }),
        };

        let mut reason_code_map = BTreeMap::new();
        if let Some(mapping) = obj.get("reason_code_map").and_then(YamlValue::as_mapping) {
            for (key, value) in mapping {
                if let (Some(rule_id), Some(code)) = (key.as_str(), value.as_str()) {
                    reason_code_map.insert(rule_id.to_string(), code.to_string());
                }
            }
        }

        Ok(Strategy {
            id,
            version: YamlParser::get_optional_u32(obj, "version")?.unwrap_or(1),
            name: YamlParser::get_optional_string(obj, "name"),
            evaluation_mode,
            knock_out_rules: RuleParser::parse_rule_list(obj, "knock_out_rules")?,
            overlay_rules: RuleParser::parse_rule_list(obj, "overlay_rules")?,
            score_cutoffs,
            reason_code_map,
            score_gate,
        })
    }
}

/// Assessment parser
pub struct AssessmentParser;

impl AssessmentParser {
    /// Parse an assessment from a YAML string with a top-level `assessment:` key
    pub fn parse(yaml_str: &str) -> Result<Assessment> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<Assessment> {
        let obj = yaml.get("assessment").ok_or_else(|| ParseError::MissingField {
            field: "assessment".to_string(),
        })?;
        Self::parse_assessment(obj)
    }

    pub fn parse_assessment(obj: &YamlValue) -> Result<Assessment> {
        let id = YamlParser::get_string(obj, "id")?;
        YamlParser::validate_fields(obj, ASSESSMENT_FIELDS, &format!("assessment '{}'", id));

        Ok(Assessment {
            id,
            name: YamlParser::get_optional_string(obj, "name"),
            rules: RuleParser::parse_rule_list(obj, "rules")?,
        })
    }
}

fn parse_mode(s: &str) -> Result<EvaluationMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "sequential" => Ok(EvaluationMode::Sequential),
        "dual_path" => Ok(EvaluationMode::DualPath),
        "scoring" => Ok(EvaluationMode::Scoring),
        "hybrid" => Ok(EvaluationMode::Hybrid),
        other => Err(ParseError::InvalidValue {
            field: "evaluation_mode".to_string(),
            message: format!(
                "unknown evaluation mode '{}', expected sequential, dual_path, scoring or hybrid",
                other
            ),
        }),
    }
}

fn parse_decision(field: &str, s: &str) -> Result<Decision> {
    match s.trim().to_ascii_lowercase().as_str() {
        "approve" => Ok(Decision::Approve),
        "decline" => Ok(Decision::Decline),
        "refer" => Ok(Decision::Refer),
        other => Err(ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("unknown decision '{}'", other),
        }),
    }
}

fn parse_cutoff(obj: &YamlValue) -> Result<ScoreCutoff> {
    Ok(ScoreCutoff {
        band: YamlParser::get_string(obj, "band")?,
        min_score: YamlParser::get_f64(obj, "min_score")?,
        outcome: parse_decision("outcome", &YamlParser::get_string(obj, "outcome")?)?,
    })
}
