//! YAML Parser
//!
//! Provides utilities for reading YAML configuration documents.

use crate::error::{ParseError, Result};
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use underwrite_core::Value;

/// Top-level keys that start a new document
pub(crate) const DOCUMENT_KEYS: [&str; 4] = ["catalog:", "tree:", "strategy:", "assessment:"];

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Parse YAML string containing multiple documents (separated by `---` or
    /// auto-detected). Returns one YAML value per document.
    ///
    /// A `catalog:`, `tree:`, `strategy:` or `assessment:` key at column 0
    /// starts a new document even without an explicit separator.
    pub fn parse_multi_document(yaml_str: &str) -> Result<Vec<YamlValue>> {
        use serde::Deserialize;

        let preprocessed = Self::preprocess_multi_document(yaml_str);

        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(&preprocessed) {
            let value = YamlValue::deserialize(document)?;
            if !value.is_null() {
                documents.push(value);
            }
        }

        Ok(documents)
    }

    /// Insert `---` before every document key after the first definition
    fn preprocess_multi_document(yaml_str: &str) -> String {
        let mut result = String::with_capacity(yaml_str.len() + 64);
        let mut seen_definition = false;
        let mut recent_separator = false;

        for line in yaml_str.lines() {
            let trimmed = line.trim();

            let is_definition_start = !line.starts_with(' ')
                && !line.starts_with('\t')
                && DOCUMENT_KEYS.iter().any(|key| trimmed.starts_with(key));

            if is_definition_start && seen_definition && !recent_separator {
                result.push_str("---\n");
            }
            if is_definition_start {
                seen_definition = true;
            }

            result.push_str(line);
            result.push('\n');

            if trimmed == "---" {
                recent_separator = true;
            } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
                recent_separator = false;
            }
        }

        result
    }

    /// Get a required string field from YAML object
    pub fn get_string(obj: &YamlValue, field: &str) -> Result<String> {
        Self::get_optional_string(obj, field).ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
    }

    /// Get an optional string field from YAML object. Numbers and booleans
    /// are accepted and rendered as strings (branch labels like `"1"`).
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        match obj.get(field)? {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Number(n) => Some(n.to_string()),
            YamlValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Get an optional unsigned integer field from YAML object
    pub fn get_optional_u32(obj: &YamlValue, field: &str) -> Result<Option<u32>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ParseError::InvalidValue {
                    field: field.to_string(),
                    message: "expected a non-negative integer".to_string(),
                }),
        }
    }

    /// Get an optional boolean field from YAML object
    pub fn get_optional_bool(obj: &YamlValue, field: &str) -> Result<Option<bool>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected true or false".to_string(),
            }),
        }
    }

    /// Get a required float field from YAML object
    pub fn get_f64(obj: &YamlValue, field: &str) -> Result<f64> {
        Self::get_optional_f64(obj, field)?.ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
    }

    /// Get an optional float field from YAML object
    pub fn get_optional_f64(obj: &YamlValue, field: &str) -> Result<Option<f64>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a number".to_string(),
            }),
        }
    }

    /// Get an optional array field from YAML object
    pub fn get_optional_array<'a>(obj: &'a YamlValue, field: &str) -> Option<&'a Vec<YamlValue>> {
        obj.get(field).and_then(|v| v.as_sequence())
    }

    /// Convert a YAML value into an engine value
    pub fn to_value(yaml: &YamlValue) -> Value {
        match yaml {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(*b),
            YamlValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            YamlValue::String(s) => Value::String(s.clone()),
            YamlValue::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            YamlValue::Mapping(mapping) => {
                let mut map = BTreeMap::new();
                for (key, value) in mapping {
                    if let Some(k) = key.as_str() {
                        map.insert(k.to_string(), Self::to_value(value));
                    }
                }
                Value::Object(map)
            }
            YamlValue::Tagged(tagged) => Self::to_value(&tagged.value),
        }
    }

    /// Get an optional mapping field as an ordered map of engine values
    pub fn get_value_map(obj: &YamlValue, field: &str) -> Result<BTreeMap<String, Value>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(BTreeMap::new()),
            Some(YamlValue::Mapping(_)) => match Self::to_value(&obj[field]) {
                Value::Object(map) => Ok(map),
                _ => Ok(BTreeMap::new()),
            },
            Some(_) => Err(ParseError::InvalidValue {
                field: field.to_string(),
                message: "expected a mapping".to_string(),
            }),
        }
    }

    /// Check fields in a YAML object against a list of known fields.
    /// Returns one warning per unknown field, with a suggestion when a known
    /// field is close.
    pub fn validate_fields(obj: &YamlValue, known_fields: &[&str], context: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(mapping) = obj.as_mapping() {
            for (key, _) in mapping {
                let Some(field_name) = key.as_str() else {
                    continue;
                };
                if known_fields.contains(&field_name) {
                    continue;
                }
                let suggestion = Self::find_similar_field(field_name, known_fields)
                    .map(|similar| format!(" Did you mean '{}'?", similar))
                    .unwrap_or_default();
                let warning = format!("Unknown field '{}' in {}.{}", field_name, context, suggestion);
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
        }

        warnings
    }

    /// Find similar field names using Levenshtein distance
    fn find_similar_field(field: &str, known_fields: &[&str]) -> Option<String> {
        known_fields
            .iter()
            .filter(|known| levenshtein_distance(field, known) <= 2)
            .min_by_key(|known| levenshtein_distance(field, known))
            .map(|s| s.to_string())
    }
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &c1) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &c2) in b.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
