//! Rule catalog and evaluation

mod catalog;
mod defaults;
mod evaluator;
mod result;

pub use catalog::RuleCatalog;
pub use defaults::default_rules;
pub use evaluator::RuleEvaluator;
pub use result::{AggregateOutcome, Benchmark, RuleEvaluation, RuleResult, SkipReason};

pub(crate) use catalog::ensure_unique;
