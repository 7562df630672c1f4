//! Common test utilities and fixtures

#![allow(dead_code)]

use stake_allocator::common::types::{SessionInput, StakeInput};
use stake_allocator::config::types::EngineConfig;
use stake_allocator::StakeCalculator;

/// Player ids as owned strings
pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Uncapped declarations
pub fn stakes(list: &[(&str, u64)]) -> Vec<StakeInput> {
    list.iter().map(|(p, s)| StakeInput::new(*p, *s)).collect()
}

/// Session with one uncapped declaration per listed player
pub fn session(team_a: &[(&str, u64)], team_b: &[(&str, u64)]) -> SessionInput {
    let names = |team: &[(&str, u64)]| team.iter().map(|(p, _)| p.to_string()).collect::<Vec<String>>();
    let declarations = team_a.iter().chain(team_b).map(|(p, s)| StakeInput::new(*p, *s)).collect();
    SessionInput::new(names(team_a), names(team_b), declarations)
}

/// Calculator with rounding unit 10 and floor 10
pub fn default_calculator() -> StakeCalculator {
    StakeCalculator::new(EngineConfig::default())
}

/// Team A = [P1 100, P2 50], team B = [P3 100, P4 50]
pub fn symmetric_session() -> SessionInput {
    session(&[("P1", 100), ("P2", 50)], &[("P3", 100), ("P4", 50)])
}

/// Team A = [P1 100], team B = [P2 60, P3 60]
pub fn mismatch_session() -> SessionInput {
    session(&[("P1", 100)], &[("P2", 60), ("P3", 60)])
}

/// Every player at the minimum floor
pub fn all_minimum_session() -> SessionInput {
    session(&[("P1", 10), ("P2", 10), ("P3", 10)], &[("P4", 10), ("P5", 10), ("P6", 10)])
}

/// Sample session files as the CLI reads them
pub mod session_files {
    /// Capped player plus a re-declaration
    pub const DRAFT_POD: &str = r#"{
        "team_a": ["alice", "bob", "carol"],
        "team_b": ["dave", "erin", "frank"],
        "stakes": [
            {"player_id": "alice", "max_stake": 200, "is_capped": true},
            {"player_id": "bob", "max_stake": 50},
            {"player_id": "carol", "max_stake": 30},
            {"player_id": "dave", "max_stake": 100},
            {"player_id": "erin", "max_stake": 40},
            {"player_id": "frank", "max_stake": 20},
            {"player_id": "bob", "max_stake": 40}
        ]
    }"#;

    /// Team B only has an undeclared player
    pub const EMPTY_TEAM: &str = r#"{
        "team_a": ["alice"],
        "team_b": ["dave"],
        "stakes": [{"player_id": "alice", "max_stake": 20}]
    }"#;
}
