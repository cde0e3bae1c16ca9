//! Simulation: trace, replay and impact analysis over stored applications

mod engine;
mod types;

pub use engine::SimulationEngine;
pub use types::{
    ChangeKind, ImpactChange, ImpactReport, OutcomeChange, ReplayFailure, ReplayReport,
    SimulationTrace,
};
