//! Strategy and assessment definitions
//!
//! Strategies and assessments are the terminals of a decision tree. Both are
//! immutable, version-pinned snapshots supplied by the caller.

use crate::rule::RuleDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Final decision on an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Decline,
    Refer,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Decision::Approve => "approve",
            Decision::Decline => "decline",
            Decision::Refer => "refer",
        };
        f.write_str(name)
    }
}

/// How a strategy reaches its decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Legacy rule catalog only
    Sequential,
    /// Knock-outs, then overlays, then score cutoffs
    DualPath,
    /// Score band alone
    Scoring,
    /// Score gate, then dual path
    Hybrid,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvaluationMode::Sequential => "sequential",
            EvaluationMode::DualPath => "dual_path",
            EvaluationMode::Scoring => "scoring",
            EvaluationMode::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// A score band: scores at or above `min_score` qualify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCutoff {
    pub band: String,
    pub min_score: f64,
    pub outcome: Decision,
}

/// Minimum score a hybrid strategy requires before its rule pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreGate {
    pub min_score: f64,
    #[serde(default = "default_gate_outcome")]
    pub fail_outcome: Decision,
}

fn default_gate_outcome() -> Decision {
    Decision::Decline
}

/// Strategy definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,

    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub evaluation_mode: EvaluationMode,

    #[serde(default)]
    pub knock_out_rules: Vec<RuleDefinition>,

    #[serde(default)]
    pub overlay_rules: Vec<RuleDefinition>,

    #[serde(default)]
    pub score_cutoffs: Vec<ScoreCutoff>,

    /// Rule id -> reason code
    #[serde(default)]
    pub reason_code_map: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_gate: Option<ScoreGate>,
}

fn default_version() -> u32 {
    1
}

impl Strategy {
    pub fn new(id: impl Into<String>, evaluation_mode: EvaluationMode) -> Self {
        Self {
            id: id.into(),
            version: 1,
            name: None,
            evaluation_mode,
            knock_out_rules: Vec::new(),
            overlay_rules: Vec::new(),
            score_cutoffs: Vec::new(),
            reason_code_map: BTreeMap::new(),
            score_gate: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn add_knock_out(mut self, rule: RuleDefinition) -> Self {
        self.knock_out_rules.push(rule);
        self
    }

    pub fn add_overlay(mut self, rule: RuleDefinition) -> Self {
        self.overlay_rules.push(rule);
        self
    }

    pub fn add_cutoff(mut self, band: impl Into<String>, min_score: f64, outcome: Decision) -> Self {
        self.score_cutoffs.push(ScoreCutoff {
            band: band.into(),
            min_score,
            outcome,
        });
        self
    }

    pub fn with_reason_code(mut self, rule_id: impl Into<String>, code: impl Into<String>) -> Self {
        self.reason_code_map.insert(rule_id.into(), code.into());
        self
    }

    pub fn with_score_gate(mut self, min_score: f64, fail_outcome: Decision) -> Self {
        self.score_gate = Some(ScoreGate {
            min_score,
            fail_outcome,
        });
        self
    }

    /// Reason code for a rule, falling back to the rule id
    pub fn reason_code<'a>(&'a self, rule_id: &'a str) -> &'a str {
        self.reason_code_map
            .get(rule_id)
            .map(String::as_str)
            .unwrap_or(rule_id)
    }

    /// Cutoffs ordered from the highest band down
    pub fn bands_descending(&self) -> Vec<&ScoreCutoff> {
        let mut bands: Vec<&ScoreCutoff> = self.score_cutoffs.iter().collect();
        bands.sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        bands
    }

    /// Highest band whose lower bound the score meets or exceeds
    pub fn band_for(&self, score: f64) -> Option<&ScoreCutoff> {
        self.bands_descending()
            .into_iter()
            .find(|cutoff| score >= cutoff.min_score)
    }
}

/// An assessment: a terminal that applies its own rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl Assessment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            rules: Vec::new(),
        }
    }

    pub fn add_rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }
}
