use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::common::traits::{AllocationEvent, AllocationObserver};
use crate::stakes::types::Roster;

/// Multiplier applied to the interquartile range
const IQR_FACTOR: Decimal = dec!(1.5);

/// Caps extreme max stakes with an interquartile-range rule
///
/// Quartiles are read by integer index (`n / 4`, `3n / 4`) from the sorted
/// values, without interpolation. Small or zero-variance samples give
/// `iqr = 0`, so anything above q3 is capped.
pub struct OutlierCapper;

impl OutlierCapper {
    /// Integer upper bound `floor(q3 + 1.5 * iqr)`, or `None` for no values
    pub fn upper_bound(values: &[u64]) -> Option<u64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let q1 = sorted[n / 4];
        let q3 = sorted[(3 * n) / 4];
        let iqr = Decimal::from(q3 - q1);

        (Decimal::from(q3) + IQR_FACTOR * iqr).floor().to_u64()
    }

    /// Cap every value above the bound; returns the input unchanged otherwise
    pub fn cap(stakes: &HashMap<String, u64>) -> HashMap<String, u64> {
        let values: Vec<u64> = stakes.values().copied().collect();
        let Some(bound) = Self::upper_bound(&values) else {
            return stakes.clone();
        };

        stakes
            .iter()
            .map(|(player, &stake)| (player.clone(), stake.min(bound)))
            .collect()
    }

    /// Apply the cap to every entrant's effective max across both teams
    pub fn apply(roster: &mut Roster, observer: &mut dyn AllocationObserver) {
        let values: Vec<u64> = roster.entrants().map(|e| e.effective_max).collect();
        let Some(bound) = Self::upper_bound(&values) else {
            return;
        };

        for entrant in roster.entrants_mut() {
            if entrant.effective_max > bound {
                observer.on_event(&AllocationEvent::OutlierCapped {
                    player_id: entrant.player_id.clone(),
                    from: entrant.effective_max,
                    to: bound,
                });
                entrant.effective_max = bound;
            }
        }
    }
}
