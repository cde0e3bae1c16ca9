//! Champion/challenger traffic split
//!
//! Applications routed to the champion strategy are split between it and a
//! challenger by a stable hash of the application id, so an application
//! always lands on the same arm.

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Arm an application was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Champion,
    Challenger,
}

/// Split between a production strategy and a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionChallenger {
    pub champion: String,
    pub challenger: String,

    /// Share of champion traffic sent to the challenger, 0..=100
    pub challenger_percent: u8,
}

impl ChampionChallenger {
    pub fn new(
        champion: impl Into<String>,
        challenger: impl Into<String>,
        challenger_percent: u8,
    ) -> Result<Self> {
        let split = Self {
            champion: champion.into(),
            challenger: challenger.into(),
            challenger_percent,
        };
        split.validate()?;
        Ok(split)
    }

    pub fn validate(&self) -> Result<()> {
        if self.challenger_percent > 100 {
            return Err(SdkError::ConfigError(format!(
                "challenger_percent must be within 0..=100, got {}",
                self.challenger_percent
            )));
        }
        if self.champion == self.challenger {
            return Err(SdkError::ConfigError(format!(
                "champion and challenger are the same strategy: {}",
                self.champion
            )));
        }
        Ok(())
    }

    /// Stable bucket in 0..100 for an application id
    pub fn bucket(application_id: &str) -> u8 {
        let digest = Sha256::digest(application_id.as_bytes());
        let prefix = digest[..8]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        (prefix % 100) as u8
    }

    pub fn assign(&self, application_id: &str) -> Assignment {
        if Self::bucket(application_id) < self.challenger_percent {
            Assignment::Challenger
        } else {
            Assignment::Champion
        }
    }

    pub fn strategy_for(&self, assignment: Assignment) -> &str {
        match assignment {
            Assignment::Champion => &self.champion,
            Assignment::Challenger => &self.challenger,
        }
    }
}
