//! Underwrite Parser - YAML to core types
//!
//! This crate converts YAML configuration documents into the immutable
//! snapshots the engine evaluates:
//! - Rule catalog documents (overrides and custom rules)
//! - Decision trees
//! - Strategies and assessments
//! - Multi-document bundles mixing all of the above

pub mod bundle;
pub mod catalog_parser;
pub mod error;
pub mod rule_parser;
pub mod strategy_parser;
pub mod tree_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use bundle::{BundleParser, ConfigBundle};
pub use catalog_parser::{CatalogParser, CatalogSpec};
pub use error::{ParseError, Result};
pub use rule_parser::RuleParser;
pub use strategy_parser::{AssessmentParser, StrategyParser};
pub use tree_parser::{TreeParser, TreeSpec};
pub use yaml_parser::YamlParser;
