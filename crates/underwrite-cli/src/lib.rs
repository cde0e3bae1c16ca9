//! Underwrite command-line tools
//!
//! File-based front end for decision traces, batch replays and impact
//! analysis.

pub mod commands;
pub mod config;
