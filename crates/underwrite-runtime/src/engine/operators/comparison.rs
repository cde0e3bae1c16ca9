//! Comparison operator execution

use crate::error::MalformedThreshold;
use underwrite_core::{ComparisonOperator, Threshold, Value};

/// Compare an observed value against a threshold.
///
/// Returns `Err` only when the threshold's shape does not fit the operator.
/// A value that cannot be coerced for the comparison fails closed and yields
/// `Ok(false)`.
pub fn compare(
    actual: &Value,
    op: ComparisonOperator,
    threshold: &Threshold,
) -> Result<bool, MalformedThreshold> {
    let malformed = |message: &str| MalformedThreshold {
        operator: op,
        message: message.to_string(),
    };

    if matches!(actual, Value::Null) {
        tracing::debug!("Null comparison: null {} {}, returning false", op, threshold);
        return Ok(false);
    }

    match op {
        ComparisonOperator::Gte
        | ComparisonOperator::Lte
        | ComparisonOperator::Gt
        | ComparisonOperator::Lt => {
            let right = threshold
                .as_f64()
                .ok_or_else(|| malformed("expected a numeric scalar threshold"))?;
            let Some(left) = actual.as_f64() else {
                tracing::debug!("Non-numeric value {} for {}, returning false", actual, op);
                return Ok(false);
            };
            Ok(match op {
                ComparisonOperator::Gte => left >= right,
                ComparisonOperator::Lte => left <= right,
                ComparisonOperator::Gt => left > right,
                _ => left < right,
            })
        }

        ComparisonOperator::Eq | ComparisonOperator::Neq => {
            let Threshold::Scalar(expected) = threshold else {
                return Err(malformed("expected a scalar threshold"));
            };
            let equal = values_match(actual, expected);
            Ok(if op == ComparisonOperator::Eq { equal } else { !equal })
        }

        ComparisonOperator::In | ComparisonOperator::NotIn => {
            let Threshold::List(items) = threshold else {
                return Err(malformed("expected a list threshold"));
            };
            let member = items.iter().any(|item| values_match(actual, item));
            Ok(if op == ComparisonOperator::In { member } else { !member })
        }

        ComparisonOperator::Between => {
            let (min, max) = threshold
                .bounds()
                .ok_or_else(|| malformed("expected two numeric bounds"))?;
            if min > max {
                return Err(malformed("lower bound exceeds upper bound"));
            }
            let Some(value) = actual.as_f64() else {
                tracing::debug!("Non-numeric value {} for between, returning false", actual);
                return Ok(false);
            };
            Ok(value >= min && value <= max)
        }
    }
}

/// Compare against a dynamic value, as tree conditions store them.
/// Arrays become lists and `{min, max}` objects become ranges.
pub fn compare_values(
    actual: &Value,
    op: ComparisonOperator,
    expected: &Value,
) -> Result<bool, MalformedThreshold> {
    let threshold = match expected {
        Value::Array(items) => Threshold::List(items.clone()),
        Value::Object(map) => match (
            map.get("min").and_then(Value::as_f64),
            map.get("max").and_then(Value::as_f64),
        ) {
            (Some(min), Some(max)) => Threshold::Range { min, max },
            _ => Threshold::Scalar(expected.clone()),
        },
        other => Threshold::Scalar(other.clone()),
    };
    compare(actual, op, &threshold)
}

/// Equality used by `eq`, `in` and categorical branches: loose numeric and
/// boolean coercion, strings compared case-insensitively.
pub fn values_match(actual: &Value, expected: &Value) -> bool {
    if actual.loosely_equals(expected) {
        return true;
    }
    match (actual, expected) {
        (Value::String(l), Value::String(r)) => l.trim().eq_ignore_ascii_case(r.trim()),
        _ => false,
    }
}
