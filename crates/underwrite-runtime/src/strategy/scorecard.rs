//! Scorecard collaborator
//!
//! Point calculation lives outside the engine. Strategies only need a number
//! for an applicant, so the executor takes anything that can produce one.

use underwrite_core::RuleInput;

/// Source of an application score
pub trait Scorecard: Send + Sync {
    /// Score an applicant; `None` when no score can be produced
    fn score(&self, input: &RuleInput) -> Option<f64>;
}

impl<F> Scorecard for F
where
    F: Fn(&RuleInput) -> Option<f64> + Send + Sync,
{
    fn score(&self, input: &RuleInput) -> Option<f64> {
        self(input)
    }
}

/// Returns the same score for every applicant
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedScore(pub Option<f64>);

impl Scorecard for FixedScore {
    fn score(&self, _input: &RuleInput) -> Option<f64> {
        self.0
    }
}

/// Reads the precomputed `application_score` carried on the input
#[derive(Debug, Clone, Copy, Default)]
pub struct InputScore;

impl Scorecard for InputScore {
    fn score(&self, input: &RuleInput) -> Option<f64> {
        input.application_score.filter(|score| score.is_finite())
    }
}
