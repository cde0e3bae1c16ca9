//! Rule evaluator
//!
//! Evaluates a `RuleInput` against a list of rules and aggregates the
//! outcome: any failing hard rule declines, otherwise any failing refer rule
//! refers, otherwise the application is approved. Rules that cannot be
//! evaluated are skipped and count as passed.

use crate::engine::compare;
use crate::rules::catalog::RuleCatalog;
use crate::rules::result::{AggregateOutcome, Benchmark, RuleEvaluation, RuleResult, SkipReason};
use underwrite_core::{
    AttributeRecord, CompoundLogic, RuleDefinition, RuleInput, RuleKind, Severity, Value,
};

/// Stateless rule evaluator
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Evaluate every rule of a catalog
    pub fn evaluate(input: &RuleInput, catalog: &RuleCatalog) -> RuleEvaluation {
        Self::evaluate_rules(input, catalog.rules())
    }

    /// Evaluate an explicit rule list (strategy rule sets, assessments)
    pub fn evaluate_rules(input: &RuleInput, rules: &[RuleDefinition]) -> RuleEvaluation {
        let rule_results: Vec<RuleResult> = rules
            .iter()
            .map(|rule| Self::evaluate_rule(input, rule))
            .collect();

        let benchmarks = rule_results.iter().filter_map(benchmark).collect();

        let mut evaluation = RuleEvaluation {
            outcome: AggregateOutcome::AutoApprove,
            rule_results,
            reasons: Vec::new(),
            benchmarks,
        };

        let hard: Vec<String> = evaluation
            .failures(Severity::Hard)
            .into_iter()
            .map(|r| r.rule_id.clone())
            .collect();
        let refer: Vec<String> = evaluation
            .failures(Severity::Refer)
            .into_iter()
            .map(|r| r.rule_id.clone())
            .collect();

        evaluation.outcome = if !hard.is_empty() {
            AggregateOutcome::AutoDecline
        } else if !refer.is_empty() {
            AggregateOutcome::ManualReview
        } else {
            AggregateOutcome::AutoApprove
        };
        evaluation.reasons = hard.into_iter().chain(refer).collect();

        tracing::debug!(
            outcome = %evaluation.outcome,
            rules = evaluation.rule_results.len(),
            failed = evaluation.reasons.len(),
            "Rule evaluation complete"
        );

        evaluation
    }

    /// Evaluate a single rule
    pub fn evaluate_rule(input: &RuleInput, rule: &RuleDefinition) -> RuleResult {
        let mut result = RuleResult {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            field: rule.fields().join(","),
            operator: None,
            threshold: None,
            actual: Value::Null,
            severity: rule.severity,
            passed: true,
            skipped: None,
            is_custom: rule.is_custom,
            message: String::new(),
        };

        if !rule.is_active() {
            result.skipped = Some(SkipReason::RuleDisabled);
            result.message = "rule disabled".to_string();
            return result;
        }

        match &rule.kind {
            RuleKind::Threshold(condition) => {
                result.operator = Some(condition.operator);
                result.threshold = Some(condition.threshold.clone());
                match input.field(&condition.field) {
                    None => {
                        tracing::warn!(
                            "Rule '{}' references unknown field '{}', skipped",
                            rule.id,
                            condition.field
                        );
                        return skip_unavailable(result, &condition.field);
                    }
                    Some(actual) if actual.is_missing() => {
                        return skip_unavailable(result, &condition.field)
                    }
                    Some(actual) => result.actual = actual,
                }
            }
            RuleKind::Computed {
                field,
                operator,
                threshold,
            } => {
                result.operator = Some(*operator);
                result.threshold = Some(threshold.clone());
                let actual = input.get(field.field());
                if actual.is_missing() {
                    return skip_unavailable(result, field.name());
                }
                result.actual = actual;
            }
            RuleKind::Compound { logic, conditions } => {
                let mut outcomes = Vec::with_capacity(conditions.len());
                for condition in conditions {
                    let actual = match input.field(&condition.field) {
                        Some(actual) if !actual.is_missing() => actual,
                        _ => return skip_unavailable(result, &condition.field),
                    };
                    match compare(&actual, condition.operator, &condition.threshold) {
                        Ok(passed) => outcomes.push(passed),
                        Err(malformed) => return skip_malformed(result, &rule.id, malformed),
                    }
                }
                result.passed = logic.combine(outcomes);
                result.actual = Value::Bool(result.passed);
                result.message = format!(
                    "{} of {} conditions: {}",
                    match logic {
                        CompoundLogic::And => "all",
                        CompoundLogic::Or => "any",
                    },
                    conditions.len(),
                    pass_word(result.passed)
                );
                return result;
            }
        }

        let (Some(operator), Some(threshold)) = (result.operator, result.threshold.as_ref()) else {
            return result;
        };
        match compare(&result.actual, operator, threshold) {
            Ok(passed) => {
                result.passed = passed;
                result.message = format!(
                    "{} {} {} {}: {}",
                    result.field,
                    result.actual,
                    operator.symbol(),
                    threshold,
                    pass_word(passed)
                );
                result
            }
            Err(malformed) => skip_malformed(result, &rule.id, malformed),
        }
    }
}

fn skip_unavailable(mut result: RuleResult, field: &str) -> RuleResult {
    result.passed = true;
    result.skipped = Some(SkipReason::FieldNotAvailable);
    result.message = format!("field not available: {}", field);
    result
}

fn skip_malformed(
    mut result: RuleResult,
    rule_id: &str,
    malformed: crate::error::MalformedThreshold,
) -> RuleResult {
    tracing::warn!("Rule '{}' skipped: {}", rule_id, malformed);
    result.passed = true;
    result.skipped = Some(SkipReason::MalformedThreshold);
    result.message = malformed.to_string();
    result
}

fn pass_word(passed: bool) -> &'static str {
    if passed {
        "passed"
    } else {
        "failed"
    }
}

/// Numeric distance from the threshold for evaluated single-comparison rules
fn benchmark(result: &RuleResult) -> Option<Benchmark> {
    if result.is_skipped() {
        return None;
    }
    let actual = result.actual.as_f64()?;
    let threshold = result.threshold.as_ref()?.as_f64()?;
    Some(Benchmark {
        rule_id: result.rule_id.clone(),
        field: result.field.clone(),
        actual,
        threshold,
        margin: actual - threshold,
    })
}
