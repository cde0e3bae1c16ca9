//! Rule catalog parser
//!
//! A catalog document carries the per-version changes to the default rule
//! registry:
//!
//! ```yaml
//! catalog:
//!   version: 3
//!   overrides:
//!     max_dti:
//!       threshold: 0.5
//!   custom:
//!     - id: min_monthly_income_gate
//!       field: monthly_income
//!       operator: gte
//!       threshold: 500
//! ```

use crate::error::{ParseError, Result};
use crate::rule_parser::RuleParser;
use crate::yaml_parser::YamlParser;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use underwrite_core::{RuleDefinition, RuleOverride};

const CATALOG_FIELDS: &[&str] = &["version", "overrides", "custom"];

/// Parsed catalog document, not yet merged with the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// Rule id -> override
    #[serde(default)]
    pub overrides: BTreeMap<String, RuleOverride>,

    /// Rules added on top of the defaults
    #[serde(default)]
    pub custom: Vec<RuleDefinition>,
}

/// Catalog parser
pub struct CatalogParser;

impl CatalogParser {
    /// Parse a catalog from a YAML string with a top-level `catalog:` key
    pub fn parse(yaml_str: &str) -> Result<CatalogSpec> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Parse a catalog from a YAML document
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<CatalogSpec> {
        let obj = yaml.get("catalog").ok_or_else(|| ParseError::MissingField {
            field: "catalog".to_string(),
        })?;
        Self::parse_catalog(obj)
    }

    /// Parse the body of a `catalog:` document
    pub fn parse_catalog(obj: &YamlValue) -> Result<CatalogSpec> {
        YamlParser::validate_fields(obj, CATALOG_FIELDS, "catalog");

        let version = YamlParser::get_optional_u32(obj, "version")?;

        let mut overrides = BTreeMap::new();
        match obj.get("overrides") {
            None | Some(YamlValue::Null) => {}
            Some(YamlValue::Mapping(mapping)) => {
                for (key, value) in mapping {
                    let rule_id = key.as_str().ok_or_else(|| ParseError::InvalidValue {
                        field: "overrides".to_string(),
                        message: "override keys must be rule ids".to_string(),
                    })?;
                    overrides.insert(rule_id.to_string(), RuleParser::parse_override(rule_id, value)?);
                }
            }
            Some(_) => {
                return Err(ParseError::InvalidValue {
                    field: "overrides".to_string(),
                    message: "expected a mapping of rule id to override".to_string(),
                })
            }
        }

        let custom = RuleParser::parse_rule_list(obj, "custom")?
            .into_iter()
            .map(RuleDefinition::custom)
            .collect();

        Ok(CatalogSpec {
            version,
            overrides,
            custom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use underwrite_core::{Severity, Threshold};

    #[test]
    fn test_parse_catalog() {
        let yaml = r#"
catalog:
  version: 3
  overrides:
    max_dti:
      threshold: 0.5
    min_age:
      enabled: false
  custom:
    - id: min_monthly_income_gate
      name: Income gate
      field: monthly_income
      operator: gte
      threshold: 500
      severity: hard
"#;
        let catalog = CatalogParser::parse(yaml).unwrap();
        assert_eq!(catalog.version, Some(3));
        assert_eq!(catalog.overrides.len(), 2);
        assert_eq!(
            catalog.overrides["max_dti"].threshold,
            Some(Threshold::scalar(0.5))
        );
        assert_eq!(catalog.overrides["min_age"].enabled, Some(false));

        assert_eq!(catalog.custom.len(), 1);
        assert!(catalog.custom[0].is_custom);
        assert_eq!(catalog.custom[0].severity, Severity::Hard);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = CatalogParser::parse("catalog: {}\n").unwrap();
        assert_eq!(catalog, CatalogSpec::default());
    }

    #[test]
    fn test_missing_catalog_key() {
        let err = CatalogParser::parse("rules: []\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field } if field == "catalog"));
    }

    #[test]
    fn test_overrides_must_be_mapping() {
        let err = CatalogParser::parse("catalog:\n  overrides: [a, b]\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { field, .. } if field == "overrides"));
    }
}
