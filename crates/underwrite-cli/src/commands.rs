//! Command implementations
//!
//! Each command loads its inputs from files, runs one SDK operation and
//! returns a serializable report for `main` to print.

use crate::config::CliConfig;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use underwrite_runtime::RoutingResult;
use underwrite_sdk::{
    ApplicationSnapshot, DecisionConfig, DecisionEngine, DecisionEngineBuilder, Explanation,
    ImpactReport, InputScore, ReplayReport, SimulationEngine, SimulationTrace, Value,
};

/// Output of `trace`: the full trace plus the staff explanation of it
#[derive(Debug, Serialize)]
pub struct TraceOutput {
    pub trace: SimulationTrace,
    pub explanation: Explanation,
}

pub fn trace(
    bundle: &Path,
    application: &Path,
    overrides: &[String],
    settings: &CliConfig,
) -> Result<TraceOutput> {
    let engine = build_engine(bundle, settings)?;
    let snapshot = load_snapshot(application)?;
    let overrides = overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let trace = engine
        .simulation()
        .trace(engine.config(), &snapshot, &overrides)
        .with_context(|| format!("Failed to trace application '{}'", snapshot.application_id))?;
    let explanation = Explanation::staff(&trace.result);

    Ok(TraceOutput { trace, explanation })
}

pub fn replay(bundle: &Path, applications: &Path, settings: &CliConfig) -> Result<ReplayReport> {
    let engine = build_engine(bundle, settings)?;
    let snapshots = load_snapshots(applications)?;

    Ok(engine.simulation().replay(engine.config(), &snapshots)?)
}

pub fn impact(
    old: &Path,
    new: &Path,
    applications: &Path,
    settings: &CliConfig,
) -> Result<ImpactReport> {
    let old_config = load_config(old, settings)?;
    let new_config = load_config(new, settings)?;
    let snapshots = load_snapshots(applications)?;

    let simulation =
        SimulationEngine::new(Arc::new(InputScore)).with_options(settings.replay_options());
    Ok(simulation.impact(&old_config, &new_config, &snapshots)?)
}

/// Route only; no strategy is executed
pub fn route(bundle: &Path, application: &Path, settings: &CliConfig) -> Result<RoutingResult> {
    let config = load_config(bundle, settings)?;
    let snapshot = load_snapshot(application)?;

    Ok(config.tree().route(&snapshot.context)?)
}

fn builder(bundle: &Path, settings: &CliConfig) -> DecisionEngineBuilder {
    let mut builder = DecisionEngineBuilder::new()
        .add_config_file(bundle)
        .with_replay_options(settings.replay_options());
    if let Some(tree_id) = &settings.tree_id {
        builder = builder.with_tree(tree_id.clone());
    }
    if let Some(strategy_id) = &settings.default_strategy {
        builder = builder.with_default_strategy(strategy_id.clone());
    }
    builder
}

pub fn build_engine(bundle: &Path, settings: &CliConfig) -> Result<DecisionEngine> {
    builder(bundle, settings)
        .build()
        .with_context(|| format!("Failed to load configuration from {}", bundle.display()))
}

pub fn load_config(bundle: &Path, settings: &CliConfig) -> Result<DecisionConfig> {
    builder(bundle, settings)
        .load_config()
        .with_context(|| format!("Failed to load configuration from {}", bundle.display()))
}

/// One application snapshot from a JSON file
pub fn load_snapshot(path: &Path) -> Result<ApplicationSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid application snapshot in {}", path.display()))
}

/// Application snapshots from a JSON array, or one per line for `.jsonl`
pub fn load_snapshots(path: &Path) -> Result<Vec<ApplicationSnapshot>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        return content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("Invalid application snapshot at {}:{}", path.display(), index + 1)
                })
            })
            .collect();
    }

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid application snapshots in {}", path.display()))
}

/// Parse `name=value`. The value is read as JSON when it parses, otherwise
/// taken as a string.
pub fn parse_override(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Override '{}' is not of the form name=value", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Override '{}' has an empty name", raw));
    }

    let value = serde_json::from_str::<Value>(value.trim())
        .unwrap_or_else(|_| Value::String(value.trim().to_string()));
    Ok((name.to_string(), value))
}

/// Pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}
