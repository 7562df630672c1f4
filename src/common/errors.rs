//! Error types for the stake allocation engine

use thiserror::Error;

use super::types::TeamSide;

/// Result type alias using our StakeError
pub type Result<T> = std::result::Result<T, StakeError>;

/// Main error type for stake allocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    /// Engine configuration is unusable (rounding unit, floor)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A declaration violates `max_stake > 0`
    #[error("Invalid stake declaration for player {player_id}: max stake must be positive")]
    InvalidStake { player_id: String },

    /// Declared maxima add up to more than a `u64` can hold
    #[error("Declared stakes overflow at player {player_id}")]
    StakeOverflow { player_id: String },

    /// The same player is listed on both teams
    #[error("Player {0} is listed on both teams")]
    DuplicatePlayer(String),

    /// A team has no eligible players after filtering
    #[error("Team {0} has no eligible players")]
    EmptyTeam(TeamSide),

    /// Tiered capacity check failed
    #[error(
        "Tiered allocation infeasible: team A total {team_a_total} (needs {team_b_min_required}), \
         team B total {team_b_total} (needs {team_a_min_required})"
    )]
    Infeasible {
        team_a_total: u64,
        team_b_total: u64,
        team_a_min_required: u64,
        team_b_min_required: u64,
    },

    /// Arithmetic or consistency fault inside a planner
    #[error("Computation fault: {0}")]
    ComputationFault(String),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File read errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl StakeError {
    /// Errors that stop the caller's workflow before any allocation runs
    pub fn is_fail_fast(&self) -> bool {
        matches!(
            self,
            StakeError::InvalidConfiguration(_)
                | StakeError::InvalidStake { .. }
                | StakeError::StakeOverflow { .. }
                | StakeError::DuplicatePlayer(_)
                | StakeError::EmptyTeam(_)
        )
    }

    pub(crate) fn fault(message: impl Into<String>) -> Self {
        StakeError::ComputationFault(message.into())
    }
}

impl From<std::io::Error> for StakeError {
    fn from(err: std::io::Error) -> Self {
        StakeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StakeError {
    fn from(err: serde_json::Error) -> Self {
        StakeError::JsonParse(err.to_string())
    }
}

impl From<config::ConfigError> for StakeError {
    fn from(err: config::ConfigError) -> Self {
        StakeError::Configuration(err.to_string())
    }
}
