//! Core DecisionEngine implementation

use super::decision_config::DecisionConfig;
use super::types::{ApplicationSnapshot, DecisionRecord};
use crate::champion::{Assignment, ChampionChallenger};
use crate::config::ReplayOptions;
use crate::error::{Result, SdkError};
use crate::simulation::SimulationEngine;
use std::sync::Arc;
use underwrite_core::{RoutingContext, RuleInput};
use underwrite_runtime::{
    ConfigurationError, ExecutionTarget, InputScore, RoutingResult, Scorecard, StrategyExecutor,
    StrategyResult,
};

/// Routes an application and executes the strategy or assessment it lands
/// on
pub struct DecisionEngine {
    config: Arc<DecisionConfig>,
    scorecard: Arc<dyn Scorecard>,
    champion_challenger: Option<ChampionChallenger>,
    replay: ReplayOptions,
}

/// Route + execute output shared by live decisions and simulation
pub(crate) struct Evaluation {
    pub routing: RoutingResult,
    pub result: StrategyResult,
    pub assignment: Option<Assignment>,
}

/// Champion/challenger split as it applies to one application. A recorded
/// arm wins over the hash bucket so stored decisions replay on the arm they
/// were made on.
#[derive(Clone, Copy)]
pub(crate) struct SplitFor<'a> {
    pub split: &'a ChampionChallenger,
    pub application_id: &'a str,
    pub recorded: Option<Assignment>,
}

impl<'a> SplitFor<'a> {
    pub(crate) fn new(
        split: Option<&'a ChampionChallenger>,
        snapshot: &'a ApplicationSnapshot,
    ) -> Option<Self> {
        split.map(|split| Self {
            split,
            application_id: &snapshot.application_id,
            recorded: snapshot.assignment,
        })
    }

    fn assignment(&self) -> Assignment {
        self.recorded
            .unwrap_or_else(|| self.split.assign(self.application_id))
    }
}

impl DecisionEngine {
    /// Generate a unique decision ID
    /// Format: dec_YYYYMMDDHHmmss_xxxxxx
    fn generate_decision_id() -> String {
        use chrono::Utc;
        use rand::Rng;

        let datetime_str = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let random: u32 = rand::thread_rng().gen_range(0..0xFFFFFF);

        format!("dec_{}_{:06x}", datetime_str, random)
    }

    /// Create an engine that scores applicants from their precomputed
    /// `application_score`
    pub fn new(config: DecisionConfig) -> Self {
        Self {
            config: Arc::new(config),
            scorecard: Arc::new(InputScore),
            champion_challenger: None,
            replay: ReplayOptions::default(),
        }
    }

    pub fn with_scorecard(mut self, scorecard: Arc<dyn Scorecard>) -> Self {
        self.scorecard = scorecard;
        self
    }

    pub fn with_replay_options(mut self, replay: ReplayOptions) -> Self {
        self.replay = replay;
        self
    }

    /// Split champion traffic with a challenger. Both strategies must be
    /// part of the configuration.
    pub fn with_champion_challenger(mut self, split: ChampionChallenger) -> Result<Self> {
        split.validate()?;
        for id in [&split.champion, &split.challenger] {
            if self.config.strategy(id).is_none() {
                return Err(ConfigurationError::UnknownStrategy(id.clone()).into());
            }
        }
        tracing::info!(
            "Champion/challenger split: {} vs {} ({}%)",
            split.champion,
            split.challenger,
            split.challenger_percent
        );
        self.champion_challenger = Some(split);
        Ok(self)
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn scorecard(&self) -> Arc<dyn Scorecard> {
        Arc::clone(&self.scorecard)
    }

    /// Decide one application
    pub fn decide(&self, input: &RuleInput, context: &RoutingContext) -> Result<DecisionRecord> {
        let evaluation = evaluate(&self.config, self.scorecard.as_ref(), input, context, None)?;
        Ok(Self::record(None, evaluation))
    }

    /// Decide a stored application, applying the champion/challenger split
    /// when one is configured. An arm already recorded on the snapshot is
    /// kept.
    pub fn decide_application(&self, snapshot: &ApplicationSnapshot) -> Result<DecisionRecord> {
        let split = SplitFor::new(self.champion_challenger.as_ref(), snapshot);
        let evaluation = evaluate(
            &self.config,
            self.scorecard.as_ref(),
            &snapshot.input,
            &snapshot.context,
            split,
        )?;
        Ok(Self::record(Some(snapshot.application_id.clone()), evaluation))
    }

    pub fn champion_challenger(&self) -> Option<&ChampionChallenger> {
        self.champion_challenger.as_ref()
    }

    /// Simulation engine sharing this engine's scorecard, replay options and
    /// champion/challenger split
    pub fn simulation(&self) -> SimulationEngine {
        let simulation =
            SimulationEngine::new(self.scorecard()).with_options(self.replay.clone());
        match &self.champion_challenger {
            Some(split) => simulation.with_champion_challenger(split.clone()),
            None => simulation,
        }
    }

    fn record(application_id: Option<String>, evaluation: Evaluation) -> DecisionRecord {
        let record = DecisionRecord {
            decision_id: Self::generate_decision_id(),
            decided_at: chrono::Utc::now(),
            application_id,
            outcome: evaluation.result.outcome,
            assignment: evaluation.assignment,
            routing: evaluation.routing,
            result: evaluation.result,
        };

        tracing::info!(
            decision_id = %record.decision_id,
            target = %record.result.target,
            outcome = %record.outcome,
            "Decision reached"
        );

        record
    }
}

/// Route then execute. Live decisions, traces and replays all go through
/// here.
pub(crate) fn evaluate(
    config: &DecisionConfig,
    scorecard: &dyn Scorecard,
    input: &RuleInput,
    context: &RoutingContext,
    split: Option<SplitFor<'_>>,
) -> Result<Evaluation> {
    let routing = config.tree().route(context)?;
    let executor = StrategyExecutor::new(config.catalog(), scorecard);

    let target = routing.target().ok_or_else(|| {
        SdkError::ConfigError("routing ended without a strategy or assessment".to_string())
    })?;

    let (result, assignment) = match target {
        ExecutionTarget::Strategy(id) => {
            let (strategy_id, assignment) = match split {
                Some(split) if split.split.champion == id => {
                    let assignment = split.assignment();
                    (split.split.strategy_for(assignment).to_string(), Some(assignment))
                }
                _ => (id, None),
            };
            let strategy = config
                .strategy(&strategy_id)
                .ok_or_else(|| ConfigurationError::UnknownStrategy(strategy_id.clone()))?;
            let result = executor.execute(strategy, input, Some(&routing.strategy_params))?;
            (result, assignment)
        }
        ExecutionTarget::Assessment(id) => {
            let assessment = config
                .assessment(&id)
                .ok_or_else(|| ConfigurationError::UnknownAssessment(id.clone()))?;
            let result = executor.execute_assessment(assessment, input, Some(&routing.strategy_params))?;
            (result, None)
        }
    };

    Ok(Evaluation {
        routing,
        result,
        assignment,
    })
}
