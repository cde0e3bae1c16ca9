//! Strategy executor
//!
//! Applies a strategy's evaluation mode to an applicant and records every
//! step it takes, in order:
//!
//! - `sequential`: the rule catalog alone
//! - `dual_path`: knock-out rules, then overlay rules, then score bands
//! - `scoring`: score bands alone
//! - `hybrid`: a score gate, then `dual_path` for applicants that pass it

use super::scorecard::Scorecard;
use crate::error::{ConfigurationError, Result};
use crate::result::{ExecutionTarget, StepOutcome, StepRecorder, StrategyResult};
use crate::rules::{ensure_unique, RuleCatalog, RuleEvaluator, RuleResult};
use std::collections::BTreeMap;
use underwrite_core::{
    Assessment, Decision, EvaluationMode, RuleDefinition, RuleInput, Severity, Strategy, Value,
};

/// Reason code for a score under the hybrid gate
pub const SCORE_BELOW_GATE: &str = "SCORE_BELOW_GATE";
/// Reason code for a score under every cutoff
pub const SCORE_BELOW_CUTOFF: &str = "SCORE_BELOW_CUTOFF";
/// Reason code when the scorecard produced no score
pub const SCORE_UNAVAILABLE: &str = "SCORE_UNAVAILABLE";

/// Executes strategies and assessments against one rule catalog and one
/// scorecard
pub struct StrategyExecutor<'a> {
    catalog: &'a RuleCatalog,
    scorecard: &'a dyn Scorecard,
}

/// Outcome accumulated while a mode runs
struct Verdict {
    outcome: Decision,
    reasons: Vec<String>,
    score: Option<f64>,
    band: Option<String>,
    rule_results: Vec<RuleResult>,
}

impl Verdict {
    fn new() -> Self {
        Self {
            outcome: Decision::Approve,
            reasons: Vec::new(),
            score: None,
            band: None,
            rule_results: Vec::new(),
        }
    }

    fn settle(&mut self, outcome: Decision, reasons: Vec<String>) {
        self.outcome = outcome;
        self.reasons = reasons;
    }
}

impl<'a> StrategyExecutor<'a> {
    pub fn new(catalog: &'a RuleCatalog, scorecard: &'a dyn Scorecard) -> Self {
        Self { catalog, scorecard }
    }

    /// Check that a strategy can be executed
    pub fn validate_strategy(strategy: &Strategy) -> Result<()> {
        let invalid = |message: &str| ConfigurationError::InvalidStrategy {
            strategy: strategy.id.clone(),
            message: message.to_string(),
        };

        if strategy.id.trim().is_empty() {
            return Err(invalid("strategy id is empty"));
        }

        let rules: Vec<RuleDefinition> = strategy
            .knock_out_rules
            .iter()
            .chain(&strategy.overlay_rules)
            .cloned()
            .collect();
        ensure_unique(&rules)?;

        for cutoff in &strategy.score_cutoffs {
            if cutoff.band.trim().is_empty() {
                return Err(invalid("score cutoff has an empty band name"));
            }
            if !cutoff.min_score.is_finite() {
                return Err(invalid(&format!(
                    "score cutoff '{}' has a non-finite min_score",
                    cutoff.band
                )));
            }
        }

        match strategy.evaluation_mode {
            EvaluationMode::Scoring if strategy.score_cutoffs.is_empty() => {
                Err(invalid("scoring mode needs at least one score cutoff"))
            }
            EvaluationMode::Hybrid if strategy.score_gate.is_none() => {
                Err(invalid("hybrid mode needs a score_gate"))
            }
            _ => Ok(()),
        }
    }

    /// Check that an assessment can be executed
    pub fn validate_assessment(assessment: &Assessment) -> Result<()> {
        ensure_unique(&assessment.rules)
    }

    /// Execute a strategy
    pub fn execute(
        &self,
        strategy: &Strategy,
        input: &RuleInput,
        routing_params: Option<&BTreeMap<String, Value>>,
    ) -> Result<StrategyResult> {
        Self::validate_strategy(strategy)?;

        let mut steps = StepRecorder::default();
        record_params(&mut steps, routing_params);

        let mut verdict = Verdict::new();
        match strategy.evaluation_mode {
            EvaluationMode::Sequential => self.run_sequential(strategy, input, &mut steps, &mut verdict),
            EvaluationMode::DualPath => run_dual_path(
                strategy,
                input,
                |steps| self.capture_score(input, steps),
                &mut steps,
                &mut verdict,
            ),
            EvaluationMode::Scoring => {
                let score = self.capture_score(input, &mut steps);
                verdict.score = score;
                apply_bands(strategy, score, &mut steps, &mut verdict);
            }
            EvaluationMode::Hybrid => {
                let score = self.capture_score(input, &mut steps);
                verdict.score = score;
                if passes_gate(strategy, score, &mut steps, &mut verdict) {
                    run_dual_path(strategy, input, |_| score, &mut steps, &mut verdict);
                }
            }
        }

        record_decision(&mut steps, &verdict);

        tracing::debug!(
            strategy = %strategy.id,
            version = strategy.version,
            mode = %strategy.evaluation_mode,
            outcome = %verdict.outcome,
            "Strategy executed"
        );

        Ok(StrategyResult {
            target: ExecutionTarget::Strategy(strategy.id.clone()),
            version: Some(strategy.version),
            evaluation_mode: Some(strategy.evaluation_mode),
            outcome: verdict.outcome,
            reasons: verdict.reasons,
            score: verdict.score,
            band: verdict.band,
            evaluation_steps: steps.into_steps(),
            rule_results: verdict.rule_results,
        })
    }

    /// Execute an assessment: its own rule list through the rule evaluator
    pub fn execute_assessment(
        &self,
        assessment: &Assessment,
        input: &RuleInput,
        routing_params: Option<&BTreeMap<String, Value>>,
    ) -> Result<StrategyResult> {
        Self::validate_assessment(assessment)?;

        let mut steps = StepRecorder::default();
        record_params(&mut steps, routing_params);

        let evaluation = RuleEvaluator::evaluate_rules(input, &assessment.rules);
        for result in &evaluation.rule_results {
            steps.record_rule("rule", result);
        }

        let mut verdict = Verdict::new();
        verdict.settle(evaluation.decision(), evaluation.reasons.clone());
        verdict.rule_results = evaluation.rule_results;
        record_decision(&mut steps, &verdict);

        tracing::debug!(
            assessment = %assessment.id,
            outcome = %verdict.outcome,
            "Assessment executed"
        );

        Ok(StrategyResult {
            target: ExecutionTarget::Assessment(assessment.id.clone()),
            version: None,
            evaluation_mode: None,
            outcome: verdict.outcome,
            reasons: verdict.reasons,
            score: None,
            band: None,
            evaluation_steps: steps.into_steps(),
            rule_results: verdict.rule_results,
        })
    }

    fn run_sequential(
        &self,
        strategy: &Strategy,
        input: &RuleInput,
        steps: &mut StepRecorder,
        verdict: &mut Verdict,
    ) {
        let evaluation = RuleEvaluator::evaluate(input, self.catalog);
        for result in &evaluation.rule_results {
            steps.record_rule("rule", result);
        }

        let reasons = evaluation
            .reasons
            .iter()
            .map(|id| strategy.reason_code(id).to_string())
            .collect();
        verdict.settle(evaluation.decision(), reasons);
        verdict.rule_results = evaluation.rule_results;
    }

    fn capture_score(&self, input: &RuleInput, steps: &mut StepRecorder) -> Option<f64> {
        let score = self.scorecard.score(input);
        match score {
            Some(score) => steps.record("score", StepOutcome::Recorded, format!("score {}", score)),
            None => steps.record("score", StepOutcome::Skipped, "score unavailable"),
        }
        score
    }
}

/// Knock-outs, overlays, then score bands. Stops at the first stage that
/// settles the outcome; the score is only taken once bands are reached.
fn run_dual_path(
    strategy: &Strategy,
    input: &RuleInput,
    score: impl FnOnce(&mut StepRecorder) -> Option<f64>,
    steps: &mut StepRecorder,
    verdict: &mut Verdict,
) {
    let knock_out = RuleEvaluator::evaluate_rules(input, &strategy.knock_out_rules);
    for result in &knock_out.rule_results {
        steps.record_rule("knock_out", result);
    }

    let hard = reason_codes(strategy, knock_out.failures(Severity::Hard));
    let knock_out_refer = reason_codes(strategy, knock_out.failures(Severity::Refer));
    verdict.rule_results.extend(knock_out.rule_results);

    if !hard.is_empty() {
        steps.record(
            "knock_out",
            StepOutcome::Fail,
            format!("knock-out failed: {}", hard.join(", ")),
        );
        verdict.settle(Decision::Decline, hard);
        return;
    }

    let overlay = RuleEvaluator::evaluate_rules(input, &strategy.overlay_rules);
    for result in &overlay.rule_results {
        steps.record_rule("overlay", result);
    }

    let mut overlay_failures: Vec<&RuleResult> = overlay.rule_results.iter().filter(|r| r.failed()).collect();
    overlay_failures.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));
    let refer: Vec<String> = knock_out_refer
        .into_iter()
        .chain(reason_codes(strategy, overlay_failures))
        .collect();
    verdict.rule_results.extend(overlay.rule_results);

    if !refer.is_empty() {
        steps.record(
            "overlay",
            StepOutcome::Fail,
            format!("referred: {}", refer.join(", ")),
        );
        verdict.settle(Decision::Refer, refer);
        return;
    }

    if strategy.score_cutoffs.is_empty() {
        steps.record("score_band", StepOutcome::Skipped, "no score cutoffs configured");
        verdict.settle(Decision::Approve, Vec::new());
        return;
    }

    let score = score(steps);
    verdict.score = score;
    apply_bands(strategy, score, steps, verdict);
}

/// Hybrid gate: a missing score or one under `min_score` takes the gate's
/// fail outcome
fn passes_gate(
    strategy: &Strategy,
    score: Option<f64>,
    steps: &mut StepRecorder,
    verdict: &mut Verdict,
) -> bool {
    let Some(gate) = &strategy.score_gate else {
        return true;
    };

    match score {
        Some(score) if score >= gate.min_score => {
            steps.record(
                "score_gate",
                StepOutcome::Pass,
                format!("score {} >= {}", score, gate.min_score),
            );
            true
        }
        _ => {
            let detail = match score {
                Some(score) => format!("score {} < {}", score, gate.min_score),
                None => "score unavailable".to_string(),
            };
            steps.record("score_gate", StepOutcome::Fail, detail);
            verdict.settle(gate.fail_outcome, vec![SCORE_BELOW_GATE.to_string()]);
            false
        }
    }
}

/// Highest qualifying band decides. No score refers, no qualifying band
/// declines.
fn apply_bands(
    strategy: &Strategy,
    score: Option<f64>,
    steps: &mut StepRecorder,
    verdict: &mut Verdict,
) {
    let Some(score) = score else {
        steps.record("score_band", StepOutcome::Refer, "score unavailable");
        verdict.settle(Decision::Refer, vec![SCORE_UNAVAILABLE.to_string()]);
        return;
    };

    match strategy.band_for(score) {
        Some(cutoff) => {
            let reasons = if cutoff.outcome == Decision::Approve {
                Vec::new()
            } else {
                vec![format!("SCORE_BAND_{}", cutoff.band.to_uppercase())]
            };
            steps.record(
                "score_band",
                cutoff.outcome.into(),
                format!("score {} in band {} (min {})", score, cutoff.band, cutoff.min_score),
            );
            verdict.band = Some(cutoff.band.clone());
            verdict.settle(cutoff.outcome, reasons);
        }
        None => {
            steps.record(
                "score_band",
                StepOutcome::Decline,
                format!("score {} below all cutoffs", score),
            );
            verdict.settle(Decision::Decline, vec![SCORE_BELOW_CUTOFF.to_string()]);
        }
    }
}

fn reason_codes<'r>(strategy: &Strategy, failures: impl IntoIterator<Item = &'r RuleResult>) -> Vec<String> {
    failures
        .into_iter()
        .map(|r| strategy.reason_code(&r.rule_id).to_string())
        .collect()
}

fn record_params(steps: &mut StepRecorder, params: Option<&BTreeMap<String, Value>>) {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return;
    };
    let detail = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ");
    steps.record("routing_params", StepOutcome::Recorded, detail);
}

fn record_decision(steps: &mut StepRecorder, verdict: &Verdict) {
    let mut detail = verdict.outcome.to_string();
    if let Some(band) = &verdict.band {
        detail.push_str(&format!(" (band {})", band));
    }
    if !verdict.reasons.is_empty() {
        detail.push_str(&format!(": {}", verdict.reasons.join(", ")));
    }
    steps.record("decision", verdict.outcome.into(), detail);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::FixedScore;
    use underwrite_core::{ComparisonOperator, Threshold};

    fn rule(id: &str, field: &str, op: ComparisonOperator, threshold: f64, severity: Severity) -> RuleDefinition {
        RuleDefinition::threshold(id, id, field, op, Threshold::scalar(threshold), severity)
    }

    fn dual_path() -> Strategy {
        Strategy::new("standard", EvaluationMode::DualPath)
            .with_version(3)
            .add_knock_out(rule("ko_score", "credit_score", ComparisonOperator::Gte, 550.0, Severity::Hard))
            .add_knock_out(rule("ko_dti", "dti_ratio", ComparisonOperator::Lte, 0.5, Severity::Hard))
            .add_overlay(rule("ov_amount", "loan_amount", ComparisonOperator::Lte, 10_000.0, Severity::Refer))
            .add_cutoff("A", 700.0, Decision::Approve)
            .add_cutoff("B", 600.0, Decision::Approve)
            .add_cutoff("C", 500.0, Decision::Refer)
            .with_reason_code("ko_dti", "DTI_TOO_HIGH")
    }

    fn applicant() -> RuleInput {
        RuleInput {
            credit_score: Some(640.0),
            dti_ratio: Some(0.3),
            loan_amount: Some(5_000.0),
            ..Default::default()
        }
    }

    fn step_names(result: &StrategyResult) -> Vec<&str> {
        result.evaluation_steps.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_dual_path_approves_in_top_band() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(Some(720.0));
        let executor = StrategyExecutor::new(&catalog, &scorecard);

        let result = executor.execute(&dual_path(), &applicant(), None).unwrap();
        assert_eq!(result.outcome, Decision::Approve);
        assert_eq!(result.band.as_deref(), Some("A"));
        assert_eq!(result.version, Some(3));
        assert!(result.reasons.is_empty());
        assert_eq!(
            step_names(&result),
            vec!["knock_out:ko_score", "knock_out:ko_dti", "overlay:ov_amount", "score", "score_band", "decision"]
        );
    }

    #[test]
    fn test_knock_out_short_circuits() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(Some(720.0));
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let input = RuleInput {
            credit_score: Some(500.0),
            dti_ratio: Some(0.6),
            loan_amount: Some(50_000.0),
            ..Default::default()
        };

        let result = executor.execute(&dual_path(), &input, None).unwrap();
        assert_eq!(result.outcome, Decision::Decline);
        assert_eq!(result.reasons, vec!["DTI_TOO_HIGH", "ko_score"]);
        assert!(result.band.is_none());
        assert!(!step_names(&result).iter().any(|name| name.starts_with("overlay")));
    }

    #[test]
    fn test_knock_out_decline_never_scores() {
        let catalog = RuleCatalog::defaults();
        let scorecard = |_: &RuleInput| -> Option<f64> { panic!("scorecard called before knock-outs settled") };
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let input = RuleInput {
            credit_score: Some(500.0),
            ..applicant()
        };

        let result = executor.execute(&dual_path(), &input, None).unwrap();
        assert_eq!(result.outcome, Decision::Decline);
        assert!(result.score.is_none());
        assert!(!step_names(&result).contains(&"score"));
    }

    #[test]
    fn test_overlay_failure_refers() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(Some(720.0));
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let input = RuleInput {
            loan_amount: Some(25_000.0),
            ..applicant()
        };

        let result = executor.execute(&dual_path(), &input, None).unwrap();
        assert_eq!(result.outcome, Decision::Refer);
        assert_eq!(result.reasons, vec!["ov_amount"]);
    }

    #[test]
    fn test_band_boundaries_and_below_cutoff() {
        let catalog = RuleCatalog::defaults();
        for (score, outcome, band) in [
            (700.0, Decision::Approve, Some("A")),
            (699.9, Decision::Approve, Some("B")),
            (500.0, Decision::Refer, Some("C")),
            (499.0, Decision::Decline, None),
        ] {
            let scorecard = FixedScore(Some(score));
            let executor = StrategyExecutor::new(&catalog, &scorecard);
            let result = executor.execute(&dual_path(), &applicant(), None).unwrap();
            assert_eq!(result.outcome, outcome, "score {}", score);
            assert_eq!(result.band.as_deref(), band, "score {}", score);
        }
    }

    #[test]
    fn test_refer_band_reason_code() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(Some(550.0));
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let result = executor.execute(&dual_path(), &applicant(), None).unwrap();
        assert_eq!(result.reasons, vec!["SCORE_BAND_C"]);
    }

    #[test]
    fn test_scoring_without_score_refers() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(None);
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let strategy = Strategy::new("score_only", EvaluationMode::Scoring).add_cutoff("A", 600.0, Decision::Approve);

        let result = executor.execute(&strategy, &applicant(), None).unwrap();
        assert_eq!(result.outcome, Decision::Refer);
        assert_eq!(result.reasons, vec![SCORE_UNAVAILABLE]);
        assert!(result.rule_results.is_empty());
    }

    #[test]
    fn test_hybrid_gate() {
        let catalog = RuleCatalog::defaults();
        let strategy = Strategy {
            evaluation_mode: EvaluationMode::Hybrid,
            ..dual_path()
        }
        .with_score_gate(580.0, Decision::Decline);

        let low = FixedScore(Some(560.0));
        let result = StrategyExecutor::new(&catalog, &low)
            .execute(&strategy, &applicant(), None)
            .unwrap();
        assert_eq!(result.outcome, Decision::Decline);
        assert_eq!(result.reasons, vec![SCORE_BELOW_GATE]);
        assert!(result.rule_results.is_empty());

        let high = FixedScore(Some(640.0));
        let result = StrategyExecutor::new(&catalog, &high)
            .execute(&strategy, &applicant(), None)
            .unwrap();
        assert_eq!(result.outcome, Decision::Approve);
        assert_eq!(result.band.as_deref(), Some("B"));
    }

    #[test]
    fn test_hybrid_without_gate_is_invalid() {
        let strategy = Strategy {
            evaluation_mode: EvaluationMode::Hybrid,
            ..dual_path()
        };
        assert!(matches!(
            StrategyExecutor::validate_strategy(&strategy),
            Err(ConfigurationError::InvalidStrategy { .. })
        ));
    }

    #[test]
    fn test_duplicate_rule_in_strategy() {
        let strategy = dual_path().add_overlay(rule("ko_dti", "dti_ratio", ComparisonOperator::Lte, 0.4, Severity::Refer));
        assert_eq!(
            StrategyExecutor::validate_strategy(&strategy),
            Err(ConfigurationError::DuplicateRule("ko_dti".to_string()))
        );
    }

    #[test]
    fn test_sequential_uses_catalog() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(None);
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let strategy = Strategy::new("legacy", EvaluationMode::Sequential);
        let input = RuleInput {
            credit_score: Some(500.0),
            ..Default::default()
        };

        let result = executor.execute(&strategy, &input, None).unwrap();
        assert_eq!(result.outcome, Decision::Decline);
        assert!(result.reasons.contains(&"min_credit_score".to_string()));
        assert_eq!(result.rule_results.len(), catalog.len());
    }

    #[test]
    fn test_routing_params_first_step() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(Some(720.0));
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let params = BTreeMap::from([("max_amount".to_string(), Value::Number(5000.0))]);

        let result = executor.execute(&dual_path(), &applicant(), Some(&params)).unwrap();
        let first = &result.evaluation_steps[0];
        assert_eq!(first.step, 1);
        assert_eq!(first.name, "routing_params");
        assert_eq!(first.outcome, StepOutcome::Recorded);
        assert_eq!(first.detail, "max_amount=5000");
    }

    #[test]
    fn test_assessment_execution() {
        let catalog = RuleCatalog::defaults();
        let scorecard = FixedScore(None);
        let executor = StrategyExecutor::new(&catalog, &scorecard);
        let assessment = Assessment::new("manual_review")
            .add_rule(rule("income_floor", "monthly_income", ComparisonOperator::Gte, 1000.0, Severity::Refer));
        let input = RuleInput {
            monthly_income: Some(800.0),
            ..Default::default()
        };

        let result = executor.execute_assessment(&assessment, &input, None).unwrap();
        assert_eq!(result.target, ExecutionTarget::Assessment("manual_review".to_string()));
        assert_eq!(result.outcome, Decision::Refer);
        assert_eq!(result.reasons, vec!["income_floor"]);
        assert_eq!(result.evaluation_steps.last().map(|s| s.outcome), Some(StepOutcome::Refer));
    }
}
