use std::collections::{HashMap, HashSet};

use crate::common::errors::{Result, StakeError};
use crate::common::traits::{AllocationEvent, AllocationObserver, TracingObserver};
use crate::common::types::{SessionInput, StakeInput, StakePair, TeamSide};
use crate::config::types::EngineConfig;
use crate::stakes::capping::CapPreferenceApplier;
use crate::stakes::consolidate::Consolidator;
use crate::stakes::drift;
use crate::stakes::matcher::PairingMatcher;
use crate::stakes::optimized::OptimizedPlanner;
use crate::stakes::outliers::OutlierCapper;
use crate::stakes::planner_for;
use crate::stakes::traits::AllocationPlanner;
use crate::stakes::types::{
    Allocation, Entrant, FallbackReason, PlayerAllocation, Roster, StakePlan, Strategy,
};

/// Single entry point of the allocation engine
///
/// Validates the session, applies outlier and preference caps, runs the
/// configured planner (falling back from tiered to optimized when tiered
/// fails), pairs the targets and consolidates the pairs.
#[derive(Debug, Clone, Default)]
pub struct StakeCalculator {
    config: EngineConfig,
}

impl StakeCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute a plan, reporting each step through `tracing`
    pub fn compute(&self, team_a: &[String], team_b: &[String], stakes: &[StakeInput]) -> Result<StakePlan> {
        self.compute_with_observer(team_a, team_b, stakes, &mut TracingObserver)
    }

    pub fn compute_session(&self, session: &SessionInput) -> Result<StakePlan> {
        self.compute(&session.team_a, &session.team_b, &session.stakes)
    }

    pub fn compute_with_observer(
        &self,
        team_a: &[String],
        team_b: &[String],
        stakes: &[StakeInput],
        observer: &mut dyn AllocationObserver,
    ) -> Result<StakePlan> {
        let roster = self.prepare(team_a, team_b, stakes, observer)?;

        let planner = planner_for(self.config.strategy);
        let (strategy, fallback, allocation) = self.plan_with_fallback(&*planner, &roster, observer)?;

        let pairs = PairingMatcher::new(self.config.rounding_unit).pair(&allocation, observer);
        let pairs = Consolidator::consolidate(&pairs);
        let allocations = report(&roster, &allocation, &pairs);

        Ok(StakePlan {
            strategy,
            fallback,
            pairs,
            allocations,
        })
    }

    /// Run `planner`; a failed tiered plan is retried once with the optimized planner
    fn plan_with_fallback(
        &self,
        planner: &dyn AllocationPlanner,
        roster: &Roster,
        observer: &mut dyn AllocationObserver,
    ) -> Result<(Strategy, Option<FallbackReason>, Allocation)> {
        match planner.plan(roster, &self.config, observer) {
            Ok(allocation) => Ok((planner.strategy(), None, allocation)),
            Err(err) if planner.strategy() == Strategy::Tiered => {
                let reason = FallbackReason::from_error(&err);
                observer.on_event(&AllocationEvent::FellBack {
                    reason: reason.to_string(),
                });
                let allocation = OptimizedPlanner.plan(roster, &self.config, observer)?;
                Ok((Strategy::Optimized, Some(reason), allocation))
            }
            Err(err) => Err(err),
        }
    }

    /// Validate the session and build the roster the planners see
    fn prepare(
        &self,
        team_a: &[String],
        team_b: &[String],
        stakes: &[StakeInput],
        observer: &mut dyn AllocationObserver,
    ) -> Result<Roster> {
        self.config.validate()?;

        let mut seen = HashSet::new();
        for player_id in team_a.iter().chain(team_b) {
            if !seen.insert(player_id.as_str()) {
                return Err(StakeError::DuplicatePlayer(player_id.clone()));
            }
        }

        // Later declarations replace earlier ones
        let latest: HashMap<&str, &StakeInput> =
            stakes.iter().map(|s| (s.player_id.as_str(), s)).collect();

        // Every later total is bounded by this one
        let mut declared_total: u64 = 0;
        let mut roster = Roster::default();
        for (side, members) in [(TeamSide::A, team_a), (TeamSide::B, team_b)] {
            for player_id in members {
                let Some(stake) = latest.get(player_id.as_str()) else {
                    observer.on_event(&AllocationEvent::Excluded {
                        player_id: player_id.clone(),
                        reason: "no stake declared".to_string(),
                    });
                    continue;
                };
                if stake.max_stake == 0 {
                    return Err(StakeError::InvalidStake {
                        player_id: player_id.clone(),
                    });
                }
                declared_total = declared_total.checked_add(stake.max_stake).ok_or_else(|| {
                    StakeError::StakeOverflow {
                        player_id: player_id.clone(),
                    }
                })?;
                let entrant = Entrant::new(player_id.as_str(), side, stake.max_stake);
                roster
                    .team_mut(side)
                    .push(if stake.is_capped { entrant.capped() } else { entrant });
            }
        }

        if self.config.cap_outliers {
            OutlierCapper::apply(&mut roster, observer);
        }
        CapPreferenceApplier::apply(&mut roster, observer);
        self.normalise(&mut roster, observer);

        for side in [TeamSide::A, TeamSide::B] {
            if roster.team(side).is_empty() {
                return Err(StakeError::EmptyTeam(side));
            }
        }
        Ok(roster)
    }

    /// Round every effective max down to the unit; drop players left with nothing
    fn normalise(&self, roster: &mut Roster, observer: &mut dyn AllocationObserver) {
        let unit = self.config.rounding_unit;
        for side in [TeamSide::A, TeamSide::B] {
            roster.team_mut(side).retain_mut(|entrant| {
                entrant.effective_max = drift::round_down(entrant.effective_max, unit);
                if entrant.effective_max == 0 {
                    observer.on_event(&AllocationEvent::Excluded {
                        player_id: entrant.player_id.clone(),
                        reason: format!("max stake below rounding unit {unit}"),
                    });
                }
                entrant.effective_max > 0
            });
        }
    }
}

/// Per-player outcome, team A first, in session order
fn report(roster: &Roster, allocation: &Allocation, pairs: &[StakePair]) -> Vec<PlayerAllocation> {
    roster
        .entrants()
        .map(|entrant| PlayerAllocation {
            player_id: entrant.player_id.clone(),
            team: entrant.team,
            declared_max: entrant.declared_max,
            effective_max: entrant.effective_max,
            target: allocation.target_of(&entrant.player_id).unwrap_or(0),
            paired: pairs
                .iter()
                .filter(|p| p.involves(&entrant.player_id))
                .map(|p| p.amount)
                .sum(),
        })
        .collect()
}
