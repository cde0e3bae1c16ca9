//! Trace, replay and impact analysis
//!
//! Every operation evaluates through the same route + execute path as a live
//! decision, champion/challenger split included, so a replay against the
//! configuration an application was originally decided with reproduces its
//! stored outcome.

use super::types::{
    ChangeKind, ImpactChange, ImpactReport, OutcomeChange, ReplayFailure, ReplayReport,
    SimulationTrace,
};
use crate::champion::ChampionChallenger;
use crate::config::ReplayOptions;
use crate::decision_engine::{
    evaluate, ApplicationSnapshot, DecisionConfig, Evaluation, SplitFor,
};
use crate::error::{Result, SdkError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use underwrite_core::{AttributeRecord, Value};
use underwrite_runtime::Scorecard;

/// Read-only what-if evaluation over stored applications
#[derive(Clone)]
pub struct SimulationEngine {
    scorecard: Arc<dyn Scorecard>,
    options: ReplayOptions,
    champion_challenger: Option<ChampionChallenger>,
}

impl SimulationEngine {
    pub fn new(scorecard: Arc<dyn Scorecard>) -> Self {
        Self {
            scorecard,
            options: ReplayOptions::default(),
            champion_challenger: None,
        }
    }

    pub fn with_options(mut self, options: ReplayOptions) -> Self {
        self.options = options;
        self
    }

    /// Split champion traffic the way live decisions do. Applications with a
    /// recorded arm stay on it.
    pub fn with_champion_challenger(mut self, split: ChampionChallenger) -> Self {
        self.champion_challenger = Some(split);
        self
    }

    pub fn options(&self) -> &ReplayOptions {
        &self.options
    }

    /// Evaluate one application with `overrides` merged into copies of its
    /// records. An override is applied to every record that knows the
    /// attribute; the stored snapshot is never touched.
    pub fn trace(
        &self,
        config: &DecisionConfig,
        snapshot: &ApplicationSnapshot,
        overrides: &BTreeMap<String, Value>,
    ) -> Result<SimulationTrace> {
        let (input, unknown_to_input) = snapshot.input.with_overrides(overrides)?;
        let (context, unknown_to_context) = snapshot.context.with_overrides(overrides)?;

        if let Some(name) = unknown_to_input
            .into_iter()
            .find(|name| unknown_to_context.contains(name))
        {
            return Err(SdkError::UnknownOverride(name.to_string()));
        }

        let split = SplitFor::new(self.champion_challenger.as_ref(), snapshot);
        let evaluation = evaluate(config, self.scorecard.as_ref(), &input, &context, split)?;
        let outcome = evaluation.result.outcome;

        tracing::debug!(
            application_id = %snapshot.application_id,
            overrides = overrides.len(),
            outcome = %outcome,
            "Application traced"
        );

        Ok(SimulationTrace {
            application_id: snapshot.application_id.clone(),
            applied_overrides: overrides.clone(),
            original_outcome: snapshot.original_outcome,
            outcome,
            assignment: evaluation.assignment,
            changed: snapshot
                .original_outcome
                .map_or(false, |original| original != outcome),
            routing: evaluation.routing,
            result: evaluation.result,
        })
    }

    /// Re-evaluate a batch and compare against the stored outcomes
    pub fn replay(
        &self,
        config: &DecisionConfig,
        snapshots: &[ApplicationSnapshot],
    ) -> Result<ReplayReport> {
        self.check_batch(snapshots.len())?;

        let mut report = ReplayReport {
            total: snapshots.len(),
            evaluated: 0,
            original_counts: BTreeMap::new(),
            new_counts: BTreeMap::new(),
            changed: Vec::new(),
            errors: Vec::new(),
            agreement_rate: 1.0,
        };
        let mut compared = 0usize;

        for (snapshot, evaluation) in snapshots.iter().zip(self.evaluate_batch(config, snapshots)) {
            let outcome = match evaluation {
                Ok(evaluation) => evaluation.result.outcome,
                Err(e) => {
                    report.errors.push(failure(snapshot, &e, None));
                    continue;
                }
            };

            report.evaluated += 1;
            *report.new_counts.entry(outcome).or_insert(0) += 1;

            if let Some(original) = snapshot.original_outcome {
                compared += 1;
                *report.original_counts.entry(original).or_insert(0) += 1;
                if original != outcome {
                    report.changed.push(OutcomeChange {
                        application_id: snapshot.application_id.clone(),
                        original,
                        new: outcome,
                    });
                }
            }
        }

        if compared > 0 {
            report.agreement_rate = (compared - report.changed.len()) as f64 / compared as f64;
        }

        tracing::info!(
            total = report.total,
            evaluated = report.evaluated,
            changed = report.changed.len(),
            errors = report.errors.len(),
            agreement_rate = report.agreement_rate,
            "Replay complete"
        );

        Ok(report)
    }

    /// Evaluate the same batch under two configurations and classify each
    /// application's change
    pub fn impact(
        &self,
        old: &DecisionConfig,
        new: &DecisionConfig,
        snapshots: &[ApplicationSnapshot],
    ) -> Result<ImpactReport> {
        self.check_batch(snapshots.len())?;

        let before = self.evaluate_batch(old, snapshots);
        let after = self.evaluate_batch(new, snapshots);

        let mut report = ImpactReport {
            total: snapshots.len(),
            evaluated: 0,
            newly_approved: 0,
            newly_declined: 0,
            newly_referred: 0,
            unchanged: 0,
            changes: Vec::new(),
            errors: Vec::new(),
        };

        for ((snapshot, before), after) in snapshots.iter().zip(before).zip(after) {
            let (before, after) = match (before, after) {
                (Ok(before), Ok(after)) => (before, after),
                (Err(e), _) => {
                    report.errors.push(failure(snapshot, &e, Some("old")));
                    continue;
                }
                (_, Err(e)) => {
                    report.errors.push(failure(snapshot, &e, Some("new")));
                    continue;
                }
            };

            report.evaluated += 1;
            let kind = ChangeKind::classify(before.result.outcome, after.result.outcome);
            match kind {
                ChangeKind::Unchanged => {
                    report.unchanged += 1;
                    continue;
                }
                ChangeKind::NewlyApproved => report.newly_approved += 1,
                ChangeKind::NewlyDeclined => report.newly_declined += 1,
                ChangeKind::NewlyReferred => report.newly_referred += 1,
            }

            report.changes.push(ImpactChange {
                application_id: snapshot.application_id.clone(),
                old: before.result.outcome,
                new: after.result.outcome,
                kind,
                old_target: Some(before.result.target.id().to_string()),
                new_target: Some(after.result.target.id().to_string()),
            });
        }

        tracing::info!(
            total = report.total,
            evaluated = report.evaluated,
            newly_approved = report.newly_approved,
            newly_declined = report.newly_declined,
            newly_referred = report.newly_referred,
            unchanged = report.unchanged,
            errors = report.errors.len(),
            "Impact analysis complete"
        );

        Ok(report)
    }

    fn check_batch(&self, size: usize) -> Result<()> {
        if size > self.options.max_batch_size {
            return Err(SdkError::BatchTooLarge {
                size,
                max: self.options.max_batch_size,
            });
        }
        Ok(())
    }

    /// Results in input order, parallel or not
    fn evaluate_batch(
        &self,
        config: &DecisionConfig,
        snapshots: &[ApplicationSnapshot],
    ) -> Vec<Result<Evaluation>> {
        let scorecard = self.scorecard.as_ref();
        let split = self.champion_challenger.as_ref();
        let run = |snapshot: &ApplicationSnapshot| {
            evaluate(
                config,
                scorecard,
                &snapshot.input,
                &snapshot.context,
                SplitFor::new(split, snapshot),
            )
        };

        if self.options.parallel {
            snapshots.par_iter().map(run).collect()
        } else {
            snapshots.iter().map(run).collect()
        }
    }
}

fn failure(snapshot: &ApplicationSnapshot, error: &SdkError, side: Option<&str>) -> ReplayFailure {
    tracing::warn!(
        "Application '{}' could not be evaluated: {}",
        snapshot.application_id,
        error
    );
    ReplayFailure {
        application_id: snapshot.application_id.clone(),
        error: match side {
            Some(side) => format!("{} configuration: {}", side, error),
            None => error.to_string(),
        },
    }
}
