//! Rounding-drift reconciliation shared by both planners
//!
//! After per-player allocations are rounded to the unit, their sum rarely
//! lands exactly on the capacity they were scaled against. The difference is
//! moved one rounding unit at a time until it is gone or nobody can absorb it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::errors::{Result, StakeError};

/// Difference between a capacity and what was allocated against it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    Balanced,
    /// Allocations fall short of capacity by this much
    Short(u64),
    /// Allocations exceed capacity by this much
    Over(u64),
}

impl Drift {
    pub fn between(capacity: u64, allocated: u64) -> Self {
        match capacity.cmp(&allocated) {
            std::cmp::Ordering::Equal => Drift::Balanced,
            std::cmp::Ordering::Greater => Drift::Short(capacity - allocated),
            std::cmp::Ordering::Less => Drift::Over(allocated - capacity),
        }
    }

    /// Positive when short, negative when over
    pub fn signed(self) -> i64 {
        match self {
            Drift::Balanced => 0,
            Drift::Short(amount) => i64::try_from(amount).unwrap_or(i64::MAX),
            Drift::Over(amount) => i64::try_from(amount).map(|a| -a).unwrap_or(i64::MIN),
        }
    }
}

/// One player's allocation as seen by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftSlot {
    pub allocation: u64,
    /// Allocation may never exceed this
    pub ceiling: u64,
    /// Tie-break weight, higher wins (the player's declared max)
    pub priority: u64,
}

impl DriftSlot {
    pub fn new(allocation: u64, ceiling: u64, priority: u64) -> Self {
        Self {
            allocation,
            ceiling,
            priority,
        }
    }

    fn room(&self) -> u64 {
        self.ceiling.saturating_sub(self.allocation)
    }
}

/// Absorb `drift` in whole units; returns whatever could not be absorbed
///
/// A shortfall is spread in rounds: every slot with a unit of room gets one
/// unit, most room first, before any slot gets a second. An excess comes off
/// the slot with the largest allocation that stays at or above one unit.
/// Ties go to the higher priority, then the earlier slot.
pub fn reconcile(slots: &mut [DriftSlot], drift: Drift, unit: u64) -> Drift {
    match drift {
        Drift::Balanced => Drift::Balanced,
        Drift::Short(mut remaining) => {
            while remaining >= unit {
                let round = ranked(slots, |s| s.room() >= unit, |s| s.room());
                if round.is_empty() {
                    break;
                }
                for idx in round.into_iter().take(usize::try_from(remaining / unit).unwrap_or(usize::MAX)) {
                    slots[idx].allocation += unit;
                    remaining -= unit;
                }
            }
            if remaining == 0 {
                Drift::Balanced
            } else {
                Drift::Short(remaining)
            }
        }
        Drift::Over(mut remaining) => {
            while remaining >= unit {
                let Some(&idx) = ranked(slots, |s| s.allocation >= unit.saturating_mul(2), |s| s.allocation).first() else {
                    break;
                };
                slots[idx].allocation -= unit;
                remaining -= unit;
            }
            if remaining == 0 {
                Drift::Balanced
            } else {
                Drift::Over(remaining)
            }
        }
    }
}

/// Largest multiple of `unit` not above `amount`
pub fn round_down(amount: u64, unit: u64) -> u64 {
    amount - amount % unit
}

/// `amount * numerator / denominator`, rounded down to the unit
pub fn floor_share(amount: u64, numerator: u64, denominator: u64, unit: u64) -> Result<u64> {
    units_to_amount(share_in_units(amount, numerator, denominator, unit)?.floor(), unit)
}

/// `amount * numerator / denominator`, rounded to the nearest unit with ties to even
pub fn nearest_share(amount: u64, numerator: u64, denominator: u64, unit: u64) -> Result<u64> {
    let units = share_in_units(amount, numerator, denominator, unit)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    units_to_amount(units, unit)
}

fn share_in_units(amount: u64, numerator: u64, denominator: u64, unit: u64) -> Result<Decimal> {
    let divisor = denominator
        .checked_mul(unit)
        .filter(|d| *d > 0)
        .ok_or_else(|| StakeError::fault(format!("invalid share divisor {denominator} x {unit}")))?;
    Decimal::from(amount)
        .checked_mul(Decimal::from(numerator))
        .and_then(|product| product.checked_div(Decimal::from(divisor)))
        .ok_or_else(|| StakeError::fault(format!("overflow scaling {amount} by {numerator}/{denominator}")))
}

fn units_to_amount(units: Decimal, unit: u64) -> Result<u64> {
    units
        .to_u64()
        .and_then(|u| u.checked_mul(unit))
        .ok_or_else(|| StakeError::fault(format!("allocation of {units} units out of range")))
}

/// Eligible slots, heaviest weight first, then highest priority, then earliest
fn ranked(
    slots: &[DriftSlot],
    eligible: impl Fn(&DriftSlot) -> bool,
    weight: impl Fn(&DriftSlot) -> u64,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slots.len()).filter(|&i| eligible(&slots[i])).collect();
    order.sort_by(|&x, &y| {
        (weight(&slots[y]), slots[y].priority).cmp(&(weight(&slots[x]), slots[x].priority))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_between() {
        assert_eq!(Drift::between(100, 100), Drift::Balanced);
        assert_eq!(Drift::between(100, 80), Drift::Short(20));
        assert_eq!(Drift::between(80, 100), Drift::Over(20));
        assert_eq!(Drift::Over(20).signed(), -20);
    }

    #[test]
    fn test_short_spread_one_unit_per_slot() {
        let mut slots = vec![DriftSlot::new(60, 100, 100), DriftSlot::new(50, 70, 70)];

        let left = reconcile(&mut slots, Drift::Short(30), 10);

        assert_eq!(left, Drift::Balanced);
        // one unit each, then the third to slot 0 (30 room vs 10)
        assert_eq!(slots[0].allocation, 80);
        assert_eq!(slots[1].allocation, 60);
    }

    #[test]
    fn test_short_round_favours_most_room() {
        let mut slots = vec![
            DriftSlot::new(50, 70, 70),
            DriftSlot::new(90, 130, 130),
            DriftSlot::new(60, 90, 90),
            DriftSlot::new(80, 110, 110),
        ];

        let left = reconcile(&mut slots, Drift::Short(20), 10);

        // rooms 20, 40, 30, 30: slot 1 first, then slot 3 wins the tie on priority
        assert_eq!(left, Drift::Balanced);
        assert_eq!(
            slots.iter().map(|s| s.allocation).collect::<Vec<_>>(),
            vec![50, 100, 60, 90]
        );
    }

    #[test]
    fn test_short_stops_when_no_room() {
        let mut slots = vec![DriftSlot::new(90, 100, 100)];

        let left = reconcile(&mut slots, Drift::Short(30), 10);

        assert_eq!(left, Drift::Short(20));
        assert_eq!(slots[0].allocation, 100);
    }

    #[test]
    fn test_over_comes_off_largest_allocation() {
        let mut slots = vec![DriftSlot::new(10, 60, 60), DriftSlot::new(40, 80, 80), DriftSlot::new(30, 90, 90)];

        let left = reconcile(&mut slots, Drift::Over(20), 10);

        assert_eq!(left, Drift::Balanced);
        // 40 -> 30, then 30 vs 30 ties on allocation and slot 2 has the higher priority
        assert_eq!(slots[1].allocation, 30);
        assert_eq!(slots[2].allocation, 20);
        assert_eq!(slots[0].allocation, 10);
    }

    #[test]
    fn test_over_keeps_one_unit_each() {
        let mut slots = vec![DriftSlot::new(10, 60, 60), DriftSlot::new(10, 60, 60)];

        let left = reconcile(&mut slots, Drift::Over(10), 10);

        assert_eq!(left, Drift::Over(10));
        assert!(slots.iter().all(|s| s.allocation == 10));
    }

    #[test]
    fn test_shares_round_to_unit() {
        // 60 * 100 / 120 = 50 exactly
        assert_eq!(floor_share(60, 100, 120, 10).unwrap(), 50);
        assert_eq!(nearest_share(60, 100, 120, 10).unwrap(), 50);
        // 100 * 150 / 200 = 75: floor 70, nearest ties to even 80
        assert_eq!(floor_share(100, 150, 200, 10).unwrap(), 70);
        assert_eq!(nearest_share(100, 150, 200, 10).unwrap(), 80);
        // 65 / 10 = 6.5 ties to even 6
        assert_eq!(nearest_share(65, 1, 1, 10).unwrap(), 60);
        assert!(floor_share(60, 100, 0, 10).is_err());
        assert_eq!(round_down(95, 10), 90);
    }

    #[test]
    fn test_sub_unit_drift_left_alone() {
        let mut slots = vec![DriftSlot::new(10, 60, 60)];
        assert_eq!(reconcile(&mut slots, Drift::Short(5), 10), Drift::Short(5));
        assert_eq!(slots[0].allocation, 10);
    }
}
