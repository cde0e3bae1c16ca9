//! Branch selection at condition and gate nodes

use crate::engine::{compare_values, values_match};
use crate::result::{BranchSelection, PathStep};
use underwrite_core::tree::{is_catch_all_label, OTHER_LABEL};
use underwrite_core::{
    AttributeRecord, Branch, ConditionSpec, ConditionType, RoutingContext, Value,
};

/// Evaluate a condition node
pub(crate) fn evaluate_condition(
    node_key: &str,
    spec: &ConditionSpec,
    context: &RoutingContext,
) -> PathStep {
    match spec.condition_type {
        ConditionType::Compound => evaluate_compound(node_key, spec, context),
        ConditionType::ScorecardGate => evaluate_gate(
            node_key,
            spec.attribute.as_deref().unwrap_or_default(),
            &spec.branches,
            spec.null_branch.as_deref(),
            context,
        ),
        condition_type => {
            let attribute = spec.attribute.as_deref().unwrap_or_default();
            let actual = context.lookup(attribute).unwrap_or(Value::Null);

            let (branch_taken, selection) = if actual.is_missing() {
                null_policy(&spec.branches, spec.null_branch.as_deref())
            } else {
                match condition_type {
                    ConditionType::Binary => binary_branch(node_key, spec, &actual),
                    ConditionType::Categorical => categorical_branch(&spec.branches, &actual),
                    _ => range_branch(&spec.branches, &actual),
                }
            };

            step(node_key, condition_type, Some(attribute.to_string()), actual, branch_taken, selection)
        }
    }
}

/// Evaluate a scorecard gate: numeric bands over a score attribute. A
/// missing score follows `null_branch`, else the literal "Other".
pub(crate) fn evaluate_gate(
    node_key: &str,
    attribute: &str,
    branches: &[Branch],
    null_branch: Option<&str>,
    context: &RoutingContext,
) -> PathStep {
    let actual = context.lookup(attribute).unwrap_or(Value::Null);

    let (branch_taken, selection) = if actual.is_missing() {
        match null_branch {
            Some(label) => (label.to_string(), BranchSelection::NullBranch),
            None => (OTHER_LABEL.to_string(), BranchSelection::NullFallback),
        }
    } else {
        range_branch(branches, &actual)
    };

    step(
        node_key,
        ConditionType::ScorecardGate,
        Some(attribute.to_string()),
        actual,
        branch_taken,
        selection,
    )
}

/// Missing value: `null_branch`, else the first branch named "other", else
/// the first declared branch
fn null_policy(branches: &[Branch], null_branch: Option<&str>) -> (String, BranchSelection) {
    if let Some(label) = null_branch {
        return (label.to_string(), BranchSelection::NullBranch);
    }
    let fallback = branches
        .iter()
        .find(|b| b.label.trim().eq_ignore_ascii_case("other"))
        .or_else(|| branches.first())
        .map(|b| b.label.clone())
        .unwrap_or_else(|| OTHER_LABEL.to_string());
    (fallback, BranchSelection::NullFallback)
}

/// First branch for true, second for false
fn binary_branch(node_key: &str, spec: &ConditionSpec, actual: &Value) -> (String, BranchSelection) {
    let threshold = spec.branches.first().and_then(|b| b.threshold.as_ref());
    let result = match (spec.operator, threshold) {
        (Some(op), Some(threshold)) => compare_values(actual, op, threshold).unwrap_or_else(|e| {
            tracing::warn!("Node '{}': {}, taking the false branch", node_key, e);
            false
        }),
        _ => false,
    };
    two_way(&spec.branches, result)
}

fn two_way(branches: &[Branch], result: bool) -> (String, BranchSelection) {
    let index = if result { 0 } else { 1 };
    let label = branches
        .get(index)
        .map(|b| b.label.clone())
        .unwrap_or_else(|| OTHER_LABEL.to_string());
    (label, BranchSelection::Matched)
}

/// Case-insensitive value match, then catch-all, then "Other"
fn categorical_branch(branches: &[Branch], actual: &Value) -> (String, BranchSelection) {
    let matched = branches.iter().find(|branch| {
        branch.values.iter().any(|value| match actual {
            Value::Array(items) => items.iter().any(|item| values_match(item, value)),
            _ => values_match(actual, value),
        })
    });
    match matched {
        Some(branch) => (branch.label.clone(), BranchSelection::Matched),
        None => unmatched(branches),
    }
}

/// Half-open `[min, max)` bands, first match wins
fn range_branch(branches: &[Branch], actual: &Value) -> (String, BranchSelection) {
    let matched = actual
        .as_f64()
        .and_then(|value| branches.iter().find(|branch| branch.contains(value)));
    match matched {
        Some(branch) => (branch.label.clone(), BranchSelection::Matched),
        None => unmatched(branches),
    }
}

fn unmatched(branches: &[Branch]) -> (String, BranchSelection) {
    match branches.iter().find(|b| is_catch_all_label(&b.label)) {
        Some(branch) => (branch.label.clone(), BranchSelection::CatchAll),
        None => (OTHER_LABEL.to_string(), BranchSelection::Other),
    }
}

/// AND/OR over sub-conditions. A missing sub-attribute sends the node down
/// its `null_branch` when one is declared; otherwise that sub-condition is
/// false.
fn evaluate_compound(node_key: &str, spec: &ConditionSpec, context: &RoutingContext) -> PathStep {
    let attributes = spec
        .compound_conditions
        .iter()
        .map(|c| c.attribute.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let values: Vec<Value> = spec
        .compound_conditions
        .iter()
        .map(|c| context.lookup(&c.attribute).unwrap_or(Value::Null))
        .collect();

    if let Some(label) = spec.null_branch.as_deref() {
        if values.iter().any(Value::is_missing) {
            return step(
                node_key,
                ConditionType::Compound,
                Some(attributes),
                Value::Null,
                label.to_string(),
                BranchSelection::NullBranch,
            );
        }
    }

    let results = spec
        .compound_conditions
        .iter()
        .zip(&values)
        .map(|(condition, actual)| {
            if actual.is_missing() {
                return false;
            }
            compare_values(actual, condition.operator, &condition.value).unwrap_or_else(|e| {
                tracing::warn!("Node '{}': {}, sub-condition is false", node_key, e);
                false
            })
        });
    let result = spec.compound_logic.combine(results);

    let (branch_taken, selection) = two_way(&spec.branches, result);
    step(
        node_key,
        ConditionType::Compound,
        Some(attributes),
        Value::Bool(result),
        branch_taken,
        selection,
    )
}

fn step(
    node_key: &str,
    condition_type: ConditionType,
    attribute: Option<String>,
    actual_value: Value,
    branch_taken: String,
    selection: BranchSelection,
) -> PathStep {
    tracing::debug!(
        node = node_key,
        attribute = attribute.as_deref().unwrap_or(""),
        value = %actual_value,
        branch = %branch_taken,
        "Routing step"
    );
    PathStep {
        node_key: node_key.to_string(),
        condition_type,
        attribute,
        actual_value,
        branch_taken,
        selection,
    }
}
