//! Comparison operators shared by rules and tree conditions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Greater than or equal (>=)
    Gte,
    /// Less than or equal (<=)
    Lte,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Neq,
    /// Member of a list
    In,
    /// Not a member of a list
    NotIn,
    /// Inclusive range
    Between,
}

impl ComparisonOperator {
    /// Returns true if this operator orders numbers
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::Gte
                | ComparisonOperator::Lte
                | ComparisonOperator::Gt
                | ComparisonOperator::Lt
        )
    }

    /// Returns true if this operator takes a list
    pub fn is_membership(&self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::NotIn)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Lte => "lte",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Neq => "neq",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not_in",
            ComparisonOperator::Between => "between",
        }
    }

    /// Symbol used when rendering explanations
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Neq => "!=",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not in",
            ComparisonOperator::Between => "between",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "gte" | "ge" | ">=" => ComparisonOperator::Gte,
            "lte" | "le" | "<=" => ComparisonOperator::Lte,
            "gt" | ">" => ComparisonOperator::Gt,
            "lt" | "<" => ComparisonOperator::Lt,
            "eq" | "==" | "=" => ComparisonOperator::Eq,
            "neq" | "ne" | "!=" => ComparisonOperator::Neq,
            "in" => ComparisonOperator::In,
            "not_in" | "nin" => ComparisonOperator::NotIn,
            "between" => ComparisonOperator::Between,
            other => {
                return Err(CoreError::InvalidValue(format!(
                    "unknown comparison operator '{}'",
                    other
                )))
            }
        };
        Ok(op)
    }
}

/// How sub-conditions of a compound rule or node combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundLogic {
    #[default]
    And,
    Or,
}

impl FromStr for CompoundLogic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" | "all" => Ok(CompoundLogic::And),
            "or" | "any" => Ok(CompoundLogic::Or),
            other => Err(CoreError::InvalidValue(format!(
                "unknown compound logic '{}'",
                other
            ))),
        }
    }
}

impl CompoundLogic {
    /// Combine sub-condition results
    pub fn combine<I: IntoIterator<Item = bool>>(&self, results: I) -> bool {
        let mut results = results.into_iter();
        match self {
            CompoundLogic::And => results.all(|r| r),
            CompoundLogic::Or => results.any(|r| r),
        }
    }
}
