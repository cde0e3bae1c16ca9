//! Rule catalog
//!
//! A resolved, read-only list of rule definitions. Built once per
//! configuration snapshot and passed by reference to every evaluation.

use crate::error::{ConfigurationError, Result};
use crate::rules::defaults::default_rules;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use underwrite_core::{RuleDefinition, RuleOverride};

/// Resolved rule catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalog {
    rules: Vec<RuleDefinition>,
}

impl RuleCatalog {
    /// Build a catalog from a rule list. Rule ids must be unique.
    pub fn new(rules: Vec<RuleDefinition>) -> Result<Self> {
        ensure_unique(&rules)?;
        Ok(Self { rules })
    }

    /// The default registry with no overrides
    pub fn defaults() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Merge defaults, per-rule overrides and custom rules.
    ///
    /// Overrides replace the matching default entry. Custom rules whose id
    /// matches a default replace it in place; the rest are appended in the
    /// order given.
    pub fn resolve(
        defaults: Vec<RuleDefinition>,
        overrides: &BTreeMap<String, RuleOverride>,
        custom: Vec<RuleDefinition>,
    ) -> Result<Self> {
        ensure_unique(&defaults)?;
        ensure_unique(&custom)?;

        let mut rules = defaults;

        for (rule_id, ovr) in overrides {
            match rules.iter().position(|r| &r.id == rule_id) {
                Some(index) => {
                    let (replaced, threshold_applied) = rules[index].with_override(ovr);
                    if !threshold_applied {
                        tracing::warn!(
                            "Override for compound rule '{}' carries a threshold, ignored",
                            rule_id
                        );
                    }
                    rules[index] = replaced;
                }
                None => {
                    tracing::warn!("Override for unknown rule '{}' ignored", rule_id);
                }
            }
        }

        for rule in custom {
            match rules.iter().position(|r| r.id == rule.id) {
                Some(index) => {
                    tracing::debug!("Custom rule '{}' replaces the default entry", rule.id);
                    rules[index] = rule;
                }
                None => rules.push(rule),
            }
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Fail on the first repeated rule id
pub(crate) fn ensure_unique(rules: &[RuleDefinition]) -> Result<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(ConfigurationError::DuplicateRule(rule.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use underwrite_core::{ComparisonOperator, RuleKind, Severity, Threshold};

    fn income_gate(threshold: f64) -> RuleDefinition {
        RuleDefinition::threshold(
            "min_monthly_income",
            "Custom income gate",
            "monthly_income",
            ComparisonOperator::Gte,
            Threshold::scalar(threshold),
            Severity::Hard,
        )
        .custom()
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "max_dti".to_string(),
            RuleOverride {
                threshold: Some(Threshold::scalar(0.5)),
                ..Default::default()
            },
        );

        let catalog = RuleCatalog::resolve(default_rules(), &overrides, Vec::new()).unwrap();
        let rule = catalog.get("max_dti").unwrap();
        match &rule.kind {
            RuleKind::Threshold(c) => assert_eq!(c.threshold, Threshold::scalar(0.5)),
            other => panic!("Expected threshold rule, got {:?}", other),
        }
        assert_eq!(catalog.len(), default_rules().len());
    }

    #[test]
    fn test_unknown_override_ignored() {
        let mut overrides = BTreeMap::new();
        overrides.insert("no_such_rule".to_string(), RuleOverride::default());

        let catalog = RuleCatalog::resolve(default_rules(), &overrides, Vec::new()).unwrap();
        assert_eq!(catalog, RuleCatalog::defaults());
    }

    #[test]
    fn test_custom_rules_appended_or_replace() {
        let appended = income_gate(500.0);
        let mut renamed = appended.clone();
        renamed.id = "income_gate".to_string();

        let catalog =
            RuleCatalog::resolve(default_rules(), &BTreeMap::new(), vec![renamed]).unwrap();
        assert_eq!(catalog.len(), default_rules().len() + 1);
        assert_eq!(catalog.rules().last().map(|r| r.id.as_str()), Some("income_gate"));

        let catalog =
            RuleCatalog::resolve(default_rules(), &BTreeMap::new(), vec![appended]).unwrap();
        assert_eq!(catalog.len(), default_rules().len());
        assert!(catalog.get("min_monthly_income").unwrap().is_custom);
    }

    #[test]
    fn test_duplicate_custom_rules_rejected() {
        let err = RuleCatalog::resolve(
            default_rules(),
            &BTreeMap::new(),
            vec![income_gate(500.0), income_gate(600.0)],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateRule("min_monthly_income".to_string()));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        assert!(RuleCatalog::new(vec![income_gate(1.0), income_gate(2.0)]).is_err());
        assert_eq!(RuleCatalog::new(vec![income_gate(1.0)]).unwrap().len(), 1);
    }
}
