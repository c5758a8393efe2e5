//! Simulation configuration management.
//!
//! Environment variables (optionally from a `.env` file) provide the
//! defaults; command line flags override them.

use holdem_table::{
    Chips, TableConfig,
    constants::{DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_STACK, MAX_PLAYERS},
};

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of tables played in parallel
    pub tables: usize,
    /// Bots seated at each table
    pub players: usize,
    /// Hands to play per table before stopping
    pub hands: u64,
    /// Starting stack per bot
    pub stack: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Base seed; table `i` shuffles from `seed + i`
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tables: 1,
            players: 6,
            hands: 100,
            stack: DEFAULT_STARTING_STACK,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            seed: None,
        }
    }
}

/// Command line overrides, all optional
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tables: Option<usize>,
    pub players: Option<usize>,
    pub hands: Option<u64>,
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Load configuration from environment variables, then apply overrides.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but unparsable.
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            tables: overrides
                .tables
                .map_or_else(|| parse_env_or("SIM_TABLES", defaults.tables), Ok)?,
            players: overrides
                .players
                .map_or_else(|| parse_env_or("SIM_PLAYERS", defaults.players), Ok)?,
            hands: overrides
                .hands
                .map_or_else(|| parse_env_or("SIM_HANDS", defaults.hands), Ok)?,
            stack: parse_env_or("SIM_STACK", defaults.stack)?,
            small_blind: parse_env_or("TABLE_SMALL_BLIND", defaults.small_blind)?,
            big_blind: parse_env_or("TABLE_BIG_BLIND", defaults.big_blind)?,
            seed: match overrides.seed {
                Some(seed) => Some(seed),
                None => parse_env_opt("SIM_SEED")?,
            },
        };
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_TABLES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if !(2..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::Invalid {
                var: "SIM_PLAYERS".to_string(),
                reason: format!("Must be between 2 and {MAX_PLAYERS}"),
            });
        }

        if self.stack == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_STACK".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        // Blind rules are shared with the engine.
        self.table_config(0)
            .validate()
            .map_err(|e| ConfigError::Invalid {
                var: "TABLE_SMALL_BLIND/TABLE_BIG_BLIND".to_string(),
                reason: e.to_string(),
            })
    }

    /// Engine config for table number `index`
    #[must_use]
    pub fn table_config(&self, index: usize) -> TableConfig {
        TableConfig {
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            max_players: self.players,
            starting_stack: self.stack,
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64)),
            ..TableConfig::default()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not parse environment variable {var}={value}")]
    Unparsable { var: String, value: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable {
                var: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    Ok(parse_env_opt(key)?.unwrap_or(default))
}
