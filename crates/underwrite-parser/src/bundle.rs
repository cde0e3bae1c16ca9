//! Configuration bundles
//!
//! A bundle is a multi-document YAML file holding everything one decision
//! needs: an optional rule catalog, decision trees, strategies and
//! assessments. Each document is dispatched on its top-level key.

use crate::catalog_parser::{CatalogParser, CatalogSpec};
use crate::error::{ParseError, Result};
use crate::strategy_parser::{AssessmentParser, StrategyParser};
use crate::tree_parser::{TreeParser, TreeSpec};
use crate::yaml_parser::YamlParser;
use serde::{Deserialize, Serialize};
use underwrite_core::{Assessment, Strategy};

/// Every configuration document found in one source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogSpec>,

    #[serde(default)]
    pub trees: Vec<TreeSpec>,

    #[serde(default)]
    pub strategies: Vec<Strategy>,

    #[serde(default)]
    pub assessments: Vec<Assessment>,
}

impl ConfigBundle {
    /// Fold another bundle into this one
    pub fn merge(&mut self, other: ConfigBundle) -> Result<()> {
        if let Some(catalog) = other.catalog {
            if self.catalog.is_some() {
                return Err(ParseError::ParseError(
                    "more than one catalog document".to_string(),
                ));
            }
            self.catalog = Some(catalog);
        }
        self.trees.extend(other.trees);
        self.strategies.extend(other.strategies);
        self.assessments.extend(other.assessments);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_none()
            && self.trees.is_empty()
            && self.strategies.is_empty()
            && self.assessments.is_empty()
    }
}

/// Bundle parser
pub struct BundleParser;

impl BundleParser {
    /// Parse a multi-document YAML string into a bundle
    pub fn parse(yaml_str: &str) -> Result<ConfigBundle> {
        let documents = YamlParser::parse_multi_document(yaml_str)?;
        let mut bundle = ConfigBundle::default();

        for (index, document) in documents.iter().enumerate() {
            let mut single = ConfigBundle::default();

            if document.get("catalog").is_some() {
                single.catalog = Some(CatalogParser::parse_from_yaml(document)?);
            } else if document.get("tree").is_some() {
                single.trees.push(TreeParser::parse_from_yaml(document)?);
            } else if document.get("strategy").is_some() {
                single.strategies.push(StrategyParser::parse_from_yaml(document)?);
            } else if document.get("assessment").is_some() {
                single.assessments.push(AssessmentParser::parse_from_yaml(document)?);
            } else {
                let keys = document
                    .as_mapping()
                    .map(|m| {
                        m.keys()
                            .filter_map(|k| k.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                return Err(ParseError::UnknownDocument(format!(
                    "document {} has no catalog, tree, strategy or assessment key (found: {})",
                    index + 1,
                    keys
                )));
            }

            bundle.merge(single)?;
        }

        tracing::debug!(
            trees = bundle.trees.len(),
            strategies = bundle.strategies.len(),
            assessments = bundle.assessments.len(),
            has_catalog = bundle.catalog.is_some(),
            "Parsed configuration bundle"
        );

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bundle() {
        let yaml = r#"
catalog:
  overrides:
    max_dti:
      threshold: 0.5
---
tree:
  id: t
  nodes:
    - key: only
      is_root: true
      type: strategy
      strategy_id: s
strategy:
  id: s
  evaluation_mode: sequential
"#;
        let bundle = BundleParser::parse(yaml).unwrap();
        assert!(bundle.catalog.is_some());
        assert_eq!(bundle.trees.len(), 1);
        assert_eq!(bundle.strategies.len(), 1);
        assert!(bundle.assessments.is_empty());
    }

    #[test]
    fn test_unknown_document() {
        let err = BundleParser::parse("pipeline:\n  id: p\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownDocument(msg) if msg.contains("pipeline")));
    }

    #[test]
    fn test_duplicate_catalog_rejected() {
        let yaml = "catalog: {}\n---\ncatalog: {}\n";
        assert!(BundleParser::parse(yaml).is_err());
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = BundleParser::parse("# nothing here\n").unwrap();
        assert!(bundle.is_empty());
    }
}
