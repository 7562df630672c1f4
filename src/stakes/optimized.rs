use crate::common::errors::Result;
use crate::common::traits::{AllocationEvent, AllocationObserver};
use crate::common::types::TeamSide;
use crate::config::types::EngineConfig;
use crate::stakes::drift::{self, Drift, DriftSlot};
use crate::stakes::traits::AllocationPlanner;
use crate::stakes::types::{Allocation, AllocationTarget, Entrant, Roster, Strategy};

/// Equalised bet-score allocation
///
/// The lighter team is honoured in full. On the heavier team, players at or
/// below the minimum floor keep their bet and everyone above it is scaled by
/// a single bet score so all of them land on the same fraction of their max.
/// When the ceiling or the one-unit minimum leaves the teams apart, the
/// heavier side gives up the residual from its largest targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedPlanner;

impl OptimizedPlanner {
    /// Largest bet one heavier-team player may take while every lighter-team
    /// player can still be matched at the floor
    pub fn theoretical_ceiling(min_team: &[Entrant], minimum_floor: u64) -> u64 {
        let total: u64 = min_team.iter().map(|e| e.effective_max).sum();
        let reserved = (min_team.len() as u64).saturating_sub(1).saturating_mul(minimum_floor);
        total.saturating_sub(reserved).max(minimum_floor)
    }
}

fn sorted_by_max(team: &[Entrant]) -> Vec<&Entrant> {
    let mut sorted: Vec<&Entrant> = team.iter().collect();
    sorted.sort_by(|a, b| b.effective_max.cmp(&a.effective_max));
    sorted
}

impl AllocationPlanner for OptimizedPlanner {
    fn strategy(&self) -> Strategy {
        Strategy::Optimized
    }

    fn plan(
        &self,
        roster: &Roster,
        config: &EngineConfig,
        observer: &mut dyn AllocationObserver,
    ) -> Result<Allocation> {
        let unit = config.rounding_unit;
        let floor = config.minimum_floor;

        let (min_side, max_side) = if roster.total(TeamSide::A) <= roster.total(TeamSide::B) {
            (TeamSide::A, TeamSide::B)
        } else {
            (TeamSide::B, TeamSide::A)
        };
        let min_team = sorted_by_max(roster.team(min_side));
        let max_team = sorted_by_max(roster.team(max_side));
        let min_total = roster.total(min_side);

        let (at_floor, above_floor): (Vec<&Entrant>, Vec<&Entrant>) =
            max_team.into_iter().partition(|e| e.effective_max <= floor);

        let ceiling = OptimizedPlanner::theoretical_ceiling(roster.team(min_side), floor);
        let capped: Vec<u64> = above_floor.iter().map(|e| e.effective_max.min(ceiling)).collect();

        let floor_total: u64 = at_floor.iter().map(|e| e.effective_max.min(floor)).sum();
        let capacity = min_total.saturating_sub(floor_total);
        let capped_total: u64 = capped.iter().sum();

        let mut slots = Vec::with_capacity(above_floor.len());
        if capped_total > 0 {
            for (entrant, &max) in above_floor.iter().zip(&capped) {
                let share = if capacity >= capped_total {
                    drift::round_down(max, unit)
                } else {
                    drift::nearest_share(max, capacity, capped_total, unit)?
                };
                slots.push(DriftSlot::new(share.max(unit).min(max), max, entrant.declared_max));
            }

            let allocated = floor_total + slots.iter().map(|s| s.allocation).sum::<u64>();
            let requested = Drift::between(min_total, allocated);
            let unresolved = drift::reconcile(&mut slots, requested, unit);
            if requested != Drift::Balanced {
                observer.on_event(&AllocationEvent::DriftReconciled {
                    requested: requested.signed(),
                    unresolved: unresolved.signed(),
                });
            }
        }

        let min_targets = min_team
            .iter()
            .map(|e| AllocationTarget::new(&e.player_id, e.team, e.effective_max))
            .collect();
        let max_targets = above_floor
            .iter()
            .zip(&slots)
            .map(|(e, slot)| AllocationTarget::new(&e.player_id, e.team, slot.allocation))
            .chain(
                at_floor
                    .iter()
                    .map(|e| AllocationTarget::new(&e.player_id, e.team, e.effective_max.min(floor))),
            )
            .collect();

        let mut allocation = Allocation {
            min_side,
            min_team: min_targets,
            max_team: max_targets,
        };
        allocation.balance()?;

        observer.on_event(&AllocationEvent::TargetsPlanned {
            strategy: Strategy::Optimized,
            min_team: min_side,
            min_team_total: min_total,
            max_team_total: roster.total(max_side),
        });

        Ok(allocation)
    }
}
