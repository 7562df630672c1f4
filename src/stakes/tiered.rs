use crate::common::errors::{Result, StakeError};
use crate::common::traits::{AllocationEvent, AllocationObserver};
use crate::common::types::TeamSide;
use crate::config::types::EngineConfig;
use crate::stakes::drift::{self, Drift, DriftSlot};
use crate::stakes::traits::AllocationPlanner;
use crate::stakes::types::{Allocation, AllocationTarget, Entrant, Roster, Strategy, LOW_TIER_LIMIT};

/// Tiered allocation
///
/// Low-tier bettors (at or below [`LOW_TIER_LIMIT`]) and the whole lighter
/// team are honoured in full. High-tier bettors on the heavier team share
/// what is left of the lighter team's capacity in proportion to their max.
#[derive(Debug, Clone, Copy, Default)]
pub struct TieredPlanner;

impl TieredPlanner {
    /// Least a team could ever need to cover: every bet reduced to the tier limit
    pub fn min_required(team: &[Entrant]) -> u64 {
        team.iter().map(|e| e.effective_max.min(LOW_TIER_LIMIT)).sum()
    }

    /// Fails with [`StakeError::Infeasible`] when a team cannot cover the other's minimum
    pub fn check_capacity(roster: &Roster) -> Result<()> {
        let team_a_total = roster.total(TeamSide::A);
        let team_b_total = roster.total(TeamSide::B);
        let team_a_min_required = Self::min_required(&roster.team_a);
        let team_b_min_required = Self::min_required(&roster.team_b);

        if team_a_total < team_b_min_required || team_b_total < team_a_min_required {
            return Err(StakeError::Infeasible {
                team_a_total,
                team_b_total,
                team_a_min_required,
                team_b_min_required,
            });
        }
        Ok(())
    }

    /// Modified theoretical max bid for the heavier team
    ///
    /// The lighter team's capacity is first reserved for the heavier team's
    /// low-tier bets and for one tier-limit bet from every high-tier bettor
    /// but the largest. What remains is the most any single bettor may take.
    pub fn modified_max_bid(min_team_total: u64, max_team: &[Entrant], unit: u64) -> u64 {
        let low_tier: u64 = max_team
            .iter()
            .filter(|e| e.effective_max <= LOW_TIER_LIMIT)
            .map(|e| e.effective_max)
            .sum();
        let high_tier_count = max_team
            .iter()
            .filter(|e| e.effective_max > LOW_TIER_LIMIT)
            .count() as u64;
        let reserved = low_tier + LOW_TIER_LIMIT * high_tier_count.saturating_sub(1);

        let bid = min_team_total.saturating_sub(reserved).max(LOW_TIER_LIMIT);
        drift::round_down(bid, unit).max(unit)
    }
}

/// Lighter team first; ties go to team A
fn split(roster: &Roster) -> (TeamSide, TeamSide) {
    if roster.total(TeamSide::A) <= roster.total(TeamSide::B) {
        (TeamSide::A, TeamSide::B)
    } else {
        (TeamSide::B, TeamSide::A)
    }
}

impl AllocationPlanner for TieredPlanner {
    fn strategy(&self) -> Strategy {
        Strategy::Tiered
    }

    fn plan(
        &self,
        roster: &Roster,
        config: &EngineConfig,
        observer: &mut dyn AllocationObserver,
    ) -> Result<Allocation> {
        let unit = config.rounding_unit;
        Self::check_capacity(roster)?;

        let mut roster = roster.clone();
        let (min_side, max_side) = split(&roster);

        let cap = Self::modified_max_bid(roster.total(min_side), roster.team(max_side), unit);
        let mut capped = Vec::new();
        for entrant in roster.team_mut(max_side).iter_mut() {
            if entrant.effective_max > cap {
                entrant.effective_max = cap;
                capped.push(entrant.player_id.clone());
            }
        }
        if !capped.is_empty() {
            observer.on_event(&AllocationEvent::TierCapApplied { cap, players: capped });
        }

        // Capping may flip which team is lighter; one pass only
        let (min_side, max_side) = split(&roster);
        let min_team = roster.team(min_side);
        let max_team = roster.team(max_side);
        let min_total = roster.total(min_side);

        let min_targets: Vec<AllocationTarget> = min_team
            .iter()
            .map(|e| AllocationTarget::new(&e.player_id, e.team, e.effective_max))
            .collect();
        let mut max_targets: Vec<AllocationTarget> = max_team
            .iter()
            .map(|e| AllocationTarget::new(&e.player_id, e.team, e.effective_max))
            .collect();

        let low_tier_total: u64 = max_team
            .iter()
            .filter(|e| e.effective_max <= LOW_TIER_LIMIT)
            .map(|e| e.effective_max)
            .sum();

        // High tier ordered by declared max, largest first
        let mut high_tier: Vec<usize> = (0..max_team.len())
            .filter(|&i| max_team[i].effective_max > LOW_TIER_LIMIT)
            .collect();
        high_tier.sort_by(|&x, &y| max_team[y].declared_max.cmp(&max_team[x].declared_max));

        if !high_tier.is_empty() {
            let high_tier_total: u64 = high_tier.iter().map(|&i| max_team[i].effective_max).sum();
            let capacity = min_total.saturating_sub(low_tier_total);

            let mut slots = Vec::with_capacity(high_tier.len());
            for &i in &high_tier {
                let entrant = &max_team[i];
                let share = if capacity >= high_tier_total {
                    drift::round_down(entrant.effective_max, unit)
                } else {
                    drift::floor_share(entrant.effective_max, capacity, high_tier_total, unit)?
                };
                let share = share.max(unit).min(entrant.effective_max);
                slots.push(DriftSlot::new(share, entrant.effective_max, entrant.declared_max));
            }

            let allocated: u64 = low_tier_total + slots.iter().map(|s| s.allocation).sum::<u64>();
            let requested = Drift::between(min_total, allocated);
            let unresolved = drift::reconcile(&mut slots, requested, unit);
            if requested != Drift::Balanced {
                observer.on_event(&AllocationEvent::DriftReconciled {
                    requested: requested.signed(),
                    unresolved: unresolved.signed(),
                });
            }

            for (slot, &i) in slots.iter().zip(&high_tier) {
                max_targets[i].target = slot.allocation;
            }
        }

        let mut allocation = Allocation {
            min_side,
            min_team: min_targets,
            max_team: max_targets,
        };
        allocation.balance()?;

        observer.on_event(&AllocationEvent::TargetsPlanned {
            strategy: Strategy::Tiered,
            min_team: min_side,
            min_team_total: min_total,
            max_team_total: roster.total(max_side),
        });

        Ok(allocation)
    }
}
