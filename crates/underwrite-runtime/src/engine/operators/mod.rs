//! Operator execution modules
//!
//! This module contains the comparison semantics used by rules and tree
//! conditions.

mod comparison;

pub use comparison::{compare, compare_values, values_match};
