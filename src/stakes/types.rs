use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::common::errors::StakeError;
use crate::common::types::{StakePair, TeamSide};

/// Stakes at or below this amount are low tier and always fully honoured
pub const LOW_TIER_LIMIT: u64 = 50;

/// Planner selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Prioritise low-tier bettors, scale high tier proportionally
    #[default]
    Tiered,
    /// Equalised bet score across the heavier team
    Optimized,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Tiered => write!(f, "tiered"),
            Strategy::Optimized => write!(f, "optimized"),
        }
    }
}

impl FromStr for Strategy {
    type Err = StakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" => Ok(Strategy::Tiered),
            "optimized" | "optimised" => Ok(Strategy::Optimized),
            other => Err(StakeError::InvalidConfiguration(format!(
                "unknown strategy '{other}'"
            ))),
        }
    }
}

/// A participating player with their declared and post-capping max
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub player_id: String,
    pub team: TeamSide,
    /// Max as declared by the player
    pub declared_max: u64,
    /// Max after outlier, preference and rounding adjustments
    pub effective_max: u64,
    /// Opted in to capping at the opposing team's top bettor
    pub is_capped: bool,
}

impl Entrant {
    pub fn new(player_id: impl Into<String>, team: TeamSide, max: u64) -> Self {
        Self {
            player_id: player_id.into(),
            team,
            declared_max: max,
            effective_max: max,
            is_capped: false,
        }
    }

    pub fn capped(mut self) -> Self {
        self.is_capped = true;
        self
    }
}

/// Both teams' participating players, in session order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub team_a: Vec<Entrant>,
    pub team_b: Vec<Entrant>,
}

impl Roster {
    pub fn new(team_a: Vec<Entrant>, team_b: Vec<Entrant>) -> Self {
        Self { team_a, team_b }
    }

    pub fn team(&self, side: TeamSide) -> &[Entrant] {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Vec<Entrant> {
        match side {
            TeamSide::A => &mut self.team_a,
            TeamSide::B => &mut self.team_b,
        }
    }

    /// Sum of effective maxima on one team
    pub fn total(&self, side: TeamSide) -> u64 {
        self.team(side).iter().map(|e| e.effective_max).fold(0, u64::saturating_add)
    }

    /// Highest effective max on one team, 0 when empty
    pub fn highest(&self, side: TeamSide) -> u64 {
        self.team(side).iter().map(|e| e.effective_max).max().unwrap_or(0)
    }

    pub fn entrants(&self) -> impl Iterator<Item = &Entrant> {
        self.team_a.iter().chain(self.team_b.iter())
    }

    pub fn entrants_mut(&mut self) -> impl Iterator<Item = &mut Entrant> {
        self.team_a.iter_mut().chain(self.team_b.iter_mut())
    }
}

/// The amount one player will ultimately commit, before pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTarget {
    pub player_id: String,
    pub team: TeamSide,
    pub target: u64,
}

impl AllocationTarget {
    pub fn new(player_id: impl Into<String>, team: TeamSide, target: u64) -> Self {
        Self {
            player_id: player_id.into(),
            team,
            target,
        }
    }
}

/// Planner output: per-player targets split into the lighter and heavier team
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Team with the lower total max stake
    pub min_side: TeamSide,
    pub min_team: Vec<AllocationTarget>,
    pub max_team: Vec<AllocationTarget>,
}

impl Allocation {
    pub fn targets(&self) -> impl Iterator<Item = &AllocationTarget> {
        self.min_team.iter().chain(self.max_team.iter())
    }

    pub fn target_of(&self, player_id: &str) -> Option<u64> {
        self.targets().find(|t| t.player_id == player_id).map(|t| t.target)
    }

    pub fn min_total(&self) -> u64 {
        self.min_team.iter().map(|t| t.target).fold(0, u64::saturating_add)
    }

    pub fn max_total(&self) -> u64 {
        self.max_team.iter().map(|t| t.target).fold(0, u64::saturating_add)
    }

    pub fn is_balanced(&self) -> bool {
        self.min_total() == self.max_total()
    }

    /// Take any residual off the heavier side, largest target first
    pub fn balance(&mut self) -> std::result::Result<(), StakeError> {
        let (min_total, max_total) = (self.min_total(), self.max_total());
        let (heavier, mut residual) = match min_total.cmp(&max_total) {
            std::cmp::Ordering::Equal => return Ok(()),
            std::cmp::Ordering::Greater => (&mut self.min_team, min_total - max_total),
            std::cmp::Ordering::Less => (&mut self.max_team, max_total - min_total),
        };

        while residual > 0 {
            let Some(largest) = heavier
                .iter_mut()
                .filter(|t| t.target > 0)
                .reduce(|best, t| if t.target > best.target { t } else { best })
            else {
                return Err(StakeError::fault(format!("unable to absorb residual of {residual}")));
            };
            let take = residual.min(largest.target);
            largest.target -= take;
            residual -= take;
        }
        Ok(())
    }
}

/// Why the tiered planner was abandoned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// A team cannot cover the other team's minimum requirement
    Infeasible {
        team_a_total: u64,
        team_b_total: u64,
        team_a_min_required: u64,
        team_b_min_required: u64,
    },
    /// The tiered planner hit an internal fault
    Fault { message: String },
}

impl FallbackReason {
    pub fn from_error(err: &StakeError) -> Self {
        match err {
            StakeError::Infeasible {
                team_a_total,
                team_b_total,
                team_a_min_required,
                team_b_min_required,
            } => FallbackReason::Infeasible {
                team_a_total: *team_a_total,
                team_b_total: *team_b_total,
                team_a_min_required: *team_a_min_required,
                team_b_min_required: *team_b_min_required,
            },
            other => FallbackReason::Fault {
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::Infeasible {
                team_a_total,
                team_b_total,
                team_a_min_required,
                team_b_min_required,
            } => write!(
                f,
                "infeasible: A total {team_a_total} vs B minimum {team_b_min_required}, \
                 B total {team_b_total} vs A minimum {team_a_min_required}"
            ),
            FallbackReason::Fault { message } => write!(f, "fault: {message}"),
        }
    }
}

/// Per-player outcome, for reporting underallocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAllocation {
    pub player_id: String,
    pub team: TeamSide,
    pub declared_max: u64,
    pub effective_max: u64,
    pub target: u64,
    /// Sum of this player's stake pairs
    pub paired: u64,
}

impl PlayerAllocation {
    /// Amount of the target the matcher could not pair
    pub fn shortfall(&self) -> u64 {
        self.target.saturating_sub(self.paired)
    }

    /// Amount of the declared max left unused
    pub fn unallocated(&self) -> u64 {
        self.declared_max.saturating_sub(self.paired)
    }
}

/// Final result of a stake calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePlan {
    /// Planner that produced `pairs`
    pub strategy: Strategy,
    /// Set when tiered was requested but optimized ran
    pub fallback: Option<FallbackReason>,
    pub pairs: Vec<StakePair>,
    pub allocations: Vec<PlayerAllocation>,
}

impl StakePlan {
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }

    /// Total committed by one team across all pairs
    pub fn team_total(&self, side: TeamSide) -> u64 {
        self.allocations
            .iter()
            .filter(|a| a.team == side)
            .map(|a| a.paired)
            .fold(0, u64::saturating_add)
    }

    pub fn is_balanced(&self) -> bool {
        self.team_total(TeamSide::A) == self.team_total(TeamSide::B)
    }

    /// Players whose paired total fell short of their target
    pub fn shortfalls(&self) -> impl Iterator<Item = &PlayerAllocation> {
        self.allocations.iter().filter(|a| a.shortfall() > 0)
    }

    pub fn allocation_for(&self, player_id: &str) -> Option<&PlayerAllocation> {
        self.allocations.iter().find(|a| a.player_id == player_id)
    }

    /// Pairs involving one player
    pub fn pairs_for<'a>(&'a self, player_id: &'a str) -> impl Iterator<Item = &'a StakePair> + 'a {
        self.pairs.iter().filter(move |p| p.involves(player_id))
    }
}
