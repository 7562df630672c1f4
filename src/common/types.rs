//! Session-level types shared by the engine and its callers

use serde::{Deserialize, Serialize};

/// Which of the two opposing teams a player belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    /// The opposing team
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSide::A => write!(f, "A"),
            TeamSide::B => write!(f, "B"),
        }
    }
}

/// A player's stake declaration for one session
///
/// Re-declaring replaces the previous entry; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInput {
    /// Opaque player identifier, unique within a session
    pub player_id: String,
    /// The most this player will wager across all pairings
    pub max_stake: u64,
    /// Limit this player's max to the opposing team's highest bettor
    #[serde(default)]
    pub is_capped: bool,
}

impl StakeInput {
    pub fn new(player_id: impl Into<String>, max_stake: u64) -> Self {
        Self {
            player_id: player_id.into(),
            max_stake,
            is_capped: false,
        }
    }

    pub fn capped(mut self) -> Self {
        self.is_capped = true;
        self
    }
}

/// One resolved two-party betting commitment
///
/// `player_a_id` is always the team A member, `player_b_id` the team B member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StakePair {
    pub player_a_id: String,
    pub player_b_id: String,
    pub amount: u64,
}

impl StakePair {
    pub fn new(player_a_id: impl Into<String>, player_b_id: impl Into<String>, amount: u64) -> Self {
        Self {
            player_a_id: player_a_id.into(),
            player_b_id: player_b_id.into(),
            amount,
        }
    }

    /// Whether this pair involves the given player on either side
    pub fn involves(&self, player_id: &str) -> bool {
        self.player_a_id == player_id || self.player_b_id == player_id
    }

    /// The other party of this pair, if `player_id` is one of them
    pub fn counterpart(&self, player_id: &str) -> Option<&str> {
        if self.player_a_id == player_id {
            Some(&self.player_b_id)
        } else if self.player_b_id == player_id {
            Some(&self.player_a_id)
        } else {
            None
        }
    }

    /// Unordered key identifying the two counterparties
    pub fn key(&self) -> (&str, &str) {
        if self.player_a_id <= self.player_b_id {
            (&self.player_a_id, &self.player_b_id)
        } else {
            (&self.player_b_id, &self.player_a_id)
        }
    }
}

impl std::fmt::Display for StakePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}: {}", self.player_a_id, self.player_b_id, self.amount)
    }
}

/// Everything the engine needs from the session and preference collaborators
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInput {
    /// Team A membership, in session order
    pub team_a: Vec<String>,
    /// Team B membership, in session order
    pub team_b: Vec<String>,
    /// Per-player declarations
    #[serde(default)]
    pub stakes: Vec<StakeInput>,
}

impl SessionInput {
    pub fn new(team_a: Vec<String>, team_b: Vec<String>, stakes: Vec<StakeInput>) -> Self {
        Self {
            team_a,
            team_b,
            stakes,
        }
    }

    /// Latest declaration for a player (re-declarations overwrite)
    pub fn declaration(&self, player_id: &str) -> Option<&StakeInput> {
        self.stakes.iter().rev().find(|s| s.player_id == player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        let forward = StakePair::new("p1", "p3", 10);
        let backward = StakePair::new("p3", "p1", 20);
        assert_eq!(forward.key(), backward.key());
    }

    #[test]
    fn test_pair_counterpart() {
        let pair = StakePair::new("p1", "p3", 10);
        assert_eq!(pair.counterpart("p1"), Some("p3"));
        assert_eq!(pair.counterpart("p3"), Some("p1"));
        assert_eq!(pair.counterpart("p2"), None);
        assert!(pair.involves("p3"));
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let session = SessionInput::new(
            vec!["p1".into()],
            vec!["p2".into()],
            vec![StakeInput::new("p1", 50), StakeInput::new("p2", 20), StakeInput::new("p1", 100).capped()],
        );
        let latest = session.declaration("p1").unwrap();
        assert_eq!(latest.max_stake, 100);
        assert!(latest.is_capped);
    }

    #[test]
    fn test_session_deserializes_without_cap_flag() {
        let json = r#"{
            "team_a": ["p1"],
            "team_b": ["p2"],
            "stakes": [{"player_id": "p1", "max_stake": 50}, {"player_id": "p2", "max_stake": 20, "is_capped": true}]
        }"#;
        let session: SessionInput = serde_json::from_str(json).unwrap();
        assert!(!session.stakes[0].is_capped);
        assert!(session.stakes[1].is_capped);
        assert_eq!(TeamSide::A.opponent(), TeamSide::B);
    }
}
