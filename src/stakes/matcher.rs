//! Turns per-player targets into two-party pairings
//!
//! ```text
//! targets ──► exact pass ──► greedy scored pass ──► residual pass ──► pairs
//!             (equal         (best min/max combo     (fold leftovers
//!              targets)       until none >= unit)     into pairs)
//! ```

use crate::common::traits::{AllocationEvent, AllocationObserver};
use crate::common::types::{StakePair, TeamSide};
use crate::stakes::types::{Allocation, AllocationTarget};

const EXACT_BONUS: i64 = 1000;
const CONSUME_BONUS: i64 = 500;
const REMAINDER_PENALTY: i64 = 300;

#[derive(Debug)]
struct Slot<'a> {
    player_id: &'a str,
    team: TeamSide,
    target: u64,
    allocated: u64,
}

impl Slot<'_> {
    fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.allocated)
    }
}

/// A pairing under construction: indices into the min and max slot lists
#[derive(Debug, Clone, Copy)]
struct Draft {
    min: usize,
    max: usize,
    amount: u64,
}

/// Greedy, score-driven pairing of the lighter team against the heavier one
#[derive(Debug, Clone, Copy)]
pub struct PairingMatcher {
    unit: u64,
}

impl PairingMatcher {
    pub fn new(rounding_unit: u64) -> Self {
        Self { unit: rounding_unit }
    }

    /// Score of matching two remainders; higher is better
    pub fn score(&self, min_remaining: u64, max_remaining: u64) -> i64 {
        let amount = min_remaining.min(max_remaining);
        let mut score = i64::try_from(amount).unwrap_or(i64::MAX);

        if min_remaining == max_remaining {
            score += EXACT_BONUS;
        } else {
            // The smaller side is always consumed
            score += CONSUME_BONUS;
        }

        let leftover = min_remaining.abs_diff(max_remaining);
        if leftover > 0 && leftover < self.unit {
            score -= REMAINDER_PENALTY;
        }
        score
    }

    pub fn pair(&self, allocation: &Allocation, observer: &mut dyn AllocationObserver) -> Vec<StakePair> {
        let mut min_slots = slots(&allocation.min_team);
        let mut max_slots = slots(&allocation.max_team);
        let mut drafts = Vec::new();

        self.match_exact(&mut min_slots, &mut max_slots, &mut drafts);
        self.match_greedy(&mut min_slots, &mut max_slots, &mut drafts);
        self.place_residuals(&mut min_slots, &mut max_slots, &mut drafts, observer);

        drafts
            .iter()
            .filter(|d| d.amount > 0)
            .map(|d| {
                let pair = orient(&min_slots[d.min], &max_slots[d.max], d.amount);
                observer.on_event(&AllocationEvent::Paired {
                    player_a_id: pair.player_a_id.clone(),
                    player_b_id: pair.player_b_id.clone(),
                    amount: pair.amount,
                });
                pair
            })
            .collect()
    }

    /// Identical targets consume both players in one pairing
    fn match_exact(&self, min_slots: &mut [Slot], max_slots: &mut [Slot], drafts: &mut Vec<Draft>) {
        let mut order: Vec<usize> = (0..min_slots.len()).collect();
        order.sort_by(|&x, &y| min_slots[y].target.cmp(&min_slots[x].target));

        for i in order {
            let amount = min_slots[i].target;
            if amount < self.unit {
                continue;
            }
            let Some(j) = max_slots
                .iter()
                .position(|m| m.allocated == 0 && m.target == amount)
            else {
                continue;
            };
            min_slots[i].allocated += amount;
            max_slots[j].allocated += amount;
            drafts.push(Draft { min: i, max: j, amount });
        }
    }

    fn match_greedy(&self, min_slots: &mut [Slot], max_slots: &mut [Slot], drafts: &mut Vec<Draft>) {
        let mut open_min = open_by_remaining(min_slots);
        let mut open_max = open_by_remaining(max_slots);

        while !open_min.is_empty() && !open_max.is_empty() {
            let mut best: Option<(i64, usize, usize)> = None;
            for (a, &i) in open_min.iter().enumerate() {
                for (b, &j) in open_max.iter().enumerate() {
                    let (min_rem, max_rem) = (min_slots[i].remaining(), max_slots[j].remaining());
                    if min_rem.min(max_rem) < self.unit {
                        continue;
                    }
                    let score = self.score(min_rem, max_rem);
                    if best.map_or(true, |(s, _, _)| score > s) {
                        best = Some((score, a, b));
                    }
                }
            }
            let Some((_, a, b)) = best else {
                break;
            };

            let (i, j) = (open_min[a], open_max[b]);
            let amount = min_slots[i].remaining().min(max_slots[j].remaining());
            min_slots[i].allocated += amount;
            max_slots[j].allocated += amount;
            drafts.push(Draft { min: i, max: j, amount });

            if min_slots[i].remaining() < self.unit {
                open_min.remove(a);
            }
            if max_slots[j].remaining() < self.unit {
                open_max.remove(b);
            }
        }
    }

    /// Fold leftovers into existing pairings, then open new ones where a
    /// whole unit still fits. Anything else stays unallocated.
    fn place_residuals(
        &self,
        min_slots: &mut [Slot],
        max_slots: &mut [Slot],
        drafts: &mut Vec<Draft>,
        observer: &mut dyn AllocationObserver,
    ) {
        for i in 0..min_slots.len() {
            if min_slots[i].remaining() == 0 {
                continue;
            }
            for d in drafts.iter_mut().filter(|d| d.min == i) {
                let add = min_slots[i].remaining().min(max_slots[d.max].remaining());
                if add == 0 {
                    continue;
                }
                apply(&mut min_slots[i], &mut max_slots[d.max], d, add, observer);
            }
            self.open_residual(i, min_slots, max_slots, drafts, Side::Min, observer);
        }

        for j in 0..max_slots.len() {
            if max_slots[j].remaining() == 0 {
                continue;
            }
            for d in drafts.iter_mut().filter(|d| d.max == j) {
                let add = max_slots[j].remaining().min(min_slots[d.min].remaining());
                if add == 0 {
                    continue;
                }
                apply(&mut min_slots[d.min], &mut max_slots[j], d, add, observer);
            }
            self.open_residual(j, min_slots, max_slots, drafts, Side::Max, observer);
        }
    }

    fn open_residual(
        &self,
        idx: usize,
        min_slots: &mut [Slot],
        max_slots: &mut [Slot],
        drafts: &mut Vec<Draft>,
        side: Side,
        observer: &mut dyn AllocationObserver,
    ) {
        loop {
            let (own, others) = match side {
                Side::Min => (&min_slots[idx], &*max_slots),
                Side::Max => (&max_slots[idx], &*min_slots),
            };
            let leftover = own.remaining();
            if leftover == 0 {
                return;
            }
            let counterpart = (leftover >= self.unit)
                .then(|| others.iter().position(|o| o.remaining() >= self.unit))
                .flatten();
            let Some(k) = counterpart else {
                observer.on_event(&AllocationEvent::ResidualDropped {
                    player_id: own.player_id.to_string(),
                    amount: leftover,
                });
                return;
            };

            let (i, j) = match side {
                Side::Min => (idx, k),
                Side::Max => (k, idx),
            };
            let amount = self.whole_units(min_slots[i].remaining().min(max_slots[j].remaining()));
            let mut draft = Draft { min: i, max: j, amount: 0 };
            apply(&mut min_slots[i], &mut max_slots[j], &mut draft, amount, observer);
            drafts.push(draft);
        }
    }

    fn whole_units(&self, amount: u64) -> u64 {
        amount - amount % self.unit
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Min,
    Max,
}

fn slots(targets: &[AllocationTarget]) -> Vec<Slot<'_>> {
    targets
        .iter()
        .map(|t| Slot {
            player_id: &t.player_id,
            team: t.team,
            target: t.target,
            allocated: 0,
        })
        .collect()
}

/// Players with something left to pair, largest remainder first
fn open_by_remaining(slots: &[Slot]) -> Vec<usize> {
    let mut open: Vec<usize> = (0..slots.len()).filter(|&i| slots[i].remaining() > 0).collect();
    open.sort_by(|&x, &y| slots[y].remaining().cmp(&slots[x].remaining()));
    open
}

fn apply(min: &mut Slot, max: &mut Slot, draft: &mut Draft, amount: u64, observer: &mut dyn AllocationObserver) {
    min.allocated += amount;
    max.allocated += amount;
    draft.amount += amount;
    observer.on_event(&AllocationEvent::ResidualMerged {
        player_id: min.player_id.to_string(),
        counterpart_id: max.player_id.to_string(),
        amount,
    });
}

/// Team A member always goes in `player_a_id`
fn orient(min: &Slot, max: &Slot, amount: u64) -> StakePair {
    match min.team {
        TeamSide::A => StakePair::new(min.player_id, max.player_id, amount),
        TeamSide::B => StakePair::new(max.player_id, min.player_id, amount),
    }
}
