//! Blind, ante and bring-in amounts.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakes {
    pub small_blind: u64,
    pub big_blind: u64,
    #[serde(default)]
    pub ante: u64,
    #[serde(default)]
    pub bring_in: u64,
}

include!(concat!(env!("OUT_DIR"), "/stake_levels.rs"));

impl Stakes {
    /// Looks up one of the predefined stake levels.
    pub fn level(level: u32) -> Result<Stakes, ConfigError> {
        STAKE_LEVELS
            .get(&level)
            .copied()
            .ok_or(ConfigError::UnknownStakeLevel(level))
    }

    /// Bet unit on streets played at the small bet.
    pub fn small_bet(&self) -> u64 {
        self.big_blind
    }

    pub fn big_bet(&self) -> u64 {
        self.big_blind * 2
    }
}

impl Default for Stakes {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            ante: 1,
            bring_in: 2,
        }
    }
}
