//! Table configuration.

use serde::{Deserialize, Serialize};

use super::errors::TableError;
use crate::game::{
    GameSettings,
    constants::{
        DEFAULT_BIG_BLIND, DEFAULT_MAX_PLAYERS, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_STACK,
        MAX_PLAYERS, MIN_PLAYERS,
    },
    entities::{Blinds, Chips},
};

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Players with chips needed to deal a hand (default: 2)
    pub min_players: usize,

    /// Maximum number of seats (default: 9)
    pub max_players: usize,

    /// Stack a player sits down with unless they bring their own
    pub starting_stack: Chips,

    /// Join gate, compared in constant time. `None` makes the table public.
    pub password: Option<String>,

    /// Seed for the table's shuffles, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            min_players: MIN_PLAYERS,
            max_players: DEFAULT_MAX_PLAYERS,
            starting_stack: DEFAULT_STARTING_STACK,
            password: None,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), TableError> {
        if self.small_blind == 0 {
            return Err(TableError::InvalidConfig(
                "small blind must be positive".to_string(),
            ));
        }

        if self.big_blind < self.small_blind {
            return Err(TableError::InvalidConfig(format!(
                "big blind {} is smaller than small blind {}",
                self.big_blind, self.small_blind
            )));
        }

        if self.min_players < MIN_PLAYERS || self.min_players > self.max_players {
            return Err(TableError::InvalidConfig(format!(
                "min players must be between {MIN_PLAYERS} and max players ({})",
                self.max_players
            )));
        }

        if self.max_players > MAX_PLAYERS {
            return Err(TableError::InvalidConfig(format!(
                "max players must be at most {MAX_PLAYERS}"
            )));
        }

        if self.password.as_deref().is_some_and(str::is_empty) {
            return Err(TableError::InvalidConfig(
                "password must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            blinds: Blinds {
                small: self.small_blind,
                big: self.big_blind,
            },
            min_players: self.min_players,
            max_players: self.max_players,
        }
    }
}
