//! Staff- and consumer-facing explanations rendered from a strategy trace

use serde::{Deserialize, Serialize};
use std::fmt;
use underwrite_core::Decision;
use underwrite_runtime::{StepOutcome, StrategyResult};

/// Who an explanation is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Underwriters and auditors: every evaluation step
    Staff,
    /// The applicant: outcome and reason codes only
    Consumer,
}

/// Rendered explanation of one decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub audience: Audience,
    pub outcome: Decision,
    pub headline: String,
    pub lines: Vec<String>,
}

impl Explanation {
    /// Full numbered step listing
    pub fn staff(result: &StrategyResult) -> Self {
        let mut headline = format!(
            "{} by {}",
            result.outcome.to_string().to_uppercase(),
            result.target
        );
        if let Some(version) = result.version {
            headline.push_str(&format!(" v{}", version));
        }
        if let Some(mode) = result.evaluation_mode {
            headline.push_str(&format!(" ({})", mode));
        }

        let mut lines: Vec<String> = result
            .evaluation_steps
            .iter()
            .map(|step| {
                format!(
                    "{}. {} [{}] {}",
                    step.step,
                    step.name,
                    step_label(step.outcome),
                    step.detail
                )
            })
            .collect();

        match (result.score, &result.band) {
            (Some(score), Some(band)) => lines.push(format!("Score {} in band {}", score, band)),
            (Some(score), None) => lines.push(format!("Score {}", score)),
            _ => {}
        }
        if !result.reasons.is_empty() {
            lines.push(format!("Reason codes: {}", result.reasons.join(", ")));
        }

        Self {
            audience: Audience::Staff,
            outcome: result.outcome,
            headline,
            lines,
        }
    }

    /// Outcome plus reason codes; no rule detail, thresholds or scores
    pub fn consumer(result: &StrategyResult) -> Self {
        let headline = match result.outcome {
            Decision::Approve => "Your application has been approved.",
            Decision::Decline => "We are unable to approve your application.",
            Decision::Refer => "Your application needs further review.",
        };

        let lines = if result.outcome == Decision::Approve {
            Vec::new()
        } else {
            result
                .reasons
                .iter()
                .map(|code| format!("Reason: {}", code))
                .collect()
        };

        Self {
            audience: Audience::Consumer,
            outcome: result.outcome,
            headline: headline.to_string(),
            lines,
        }
    }

    pub fn for_audience(result: &StrategyResult, audience: Audience) -> Self {
        match audience {
            Audience::Staff => Self::staff(result),
            Audience::Consumer => Self::consumer(result),
        }
    }

    /// Headline and lines, one per row
    pub fn render(&self) -> String {
        std::iter::once(self.headline.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn step_label(outcome: StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Pass => "pass",
        StepOutcome::Fail => "fail",
        StepOutcome::Skipped => "skipped",
        StepOutcome::Recorded => "recorded",
        StepOutcome::Approve => "approve",
        StepOutcome::Decline => "decline",
        StepOutcome::Refer => "refer",
    }
}
