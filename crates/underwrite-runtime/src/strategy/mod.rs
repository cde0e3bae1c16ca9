//! Strategy execution

mod executor;
mod scorecard;

pub use executor::{StrategyExecutor, SCORE_BELOW_CUTOFF, SCORE_BELOW_GATE, SCORE_UNAVAILABLE};
pub use scorecard::{FixedScore, InputScore, Scorecard};
