//! Evaluation primitives shared by the rule evaluator and the tree router

pub mod operators;

pub use operators::{compare, compare_values, values_match};
