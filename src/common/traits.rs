//! Observer sink for allocation telemetry
//!
//! The engine is pure; every intermediate step is reported to an observer
//! passed by reference instead of being written to a global logger.

use tracing::{debug, info, warn};

use super::types::TeamSide;
use crate::stakes::Strategy;

/// A notable step taken while computing a stake plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationEvent {
    /// Interquartile-range cap lowered a declared max
    OutlierCapped { player_id: String, from: u64, to: u64 },
    /// Player opted in to capping at the opposing team's top bettor
    PreferenceCapped { player_id: String, from: u64, to: u64 },
    /// Player takes no part in the allocation
    Excluded { player_id: String, reason: String },
    /// Modified theoretical max bid applied to the heavier team
    TierCapApplied { cap: u64, players: Vec<String> },
    /// Per-player targets decided by a planner
    TargetsPlanned {
        strategy: Strategy,
        min_team: TeamSide,
        min_team_total: u64,
        max_team_total: u64,
    },
    /// Rounding drift corrected in whole rounding units
    DriftReconciled { requested: i64, unresolved: i64 },
    /// A pairing was created by the matcher
    Paired { player_a_id: String, player_b_id: String, amount: u64 },
    /// A leftover was folded into an existing or new pairing
    ResidualMerged { player_id: String, counterpart_id: String, amount: u64 },
    /// A leftover could not be placed and stays unallocated
    ResidualDropped { player_id: String, amount: u64 },
    /// Tiered allocation was abandoned for Optimized
    FellBack { reason: String },
}

/// Sink for allocation events
#[cfg_attr(test, mockall::automock)]
pub trait AllocationObserver {
    /// Called once per event, in the order the engine produces them
    fn on_event(&mut self, event: &AllocationEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AllocationObserver for TracingObserver {
    fn on_event(&mut self, event: &AllocationEvent) {
        match event {
            AllocationEvent::OutlierCapped { player_id, from, to } => {
                debug!(player = %player_id, from, to, "Outlier stake capped");
            }
            AllocationEvent::PreferenceCapped { player_id, from, to } => {
                debug!(player = %player_id, from, to, "Stake capped by player preference");
            }
            AllocationEvent::Excluded { player_id, reason } => {
                debug!(player = %player_id, %reason, "Player excluded from allocation");
            }
            AllocationEvent::TierCapApplied { cap, players } => {
                info!(cap, players = ?players, "Max-team bets capped");
            }
            AllocationEvent::TargetsPlanned {
                strategy,
                min_team,
                min_team_total,
                max_team_total,
            } => {
                info!(
                    ?strategy,
                    %min_team,
                    min_team_total,
                    max_team_total,
                    "Allocation targets planned"
                );
            }
            AllocationEvent::DriftReconciled { requested, unresolved } => {
                debug!(requested, unresolved, "Rounding drift reconciled");
            }
            AllocationEvent::Paired {
                player_a_id,
                player_b_id,
                amount,
            } => {
                debug!(a = %player_a_id, b = %player_b_id, amount, "Pair created");
            }
            AllocationEvent::ResidualMerged {
                player_id,
                counterpart_id,
                amount,
            } => {
                debug!(player = %player_id, counterpart = %counterpart_id, amount, "Residual merged");
            }
            AllocationEvent::ResidualDropped { player_id, amount } => {
                warn!(player = %player_id, amount, "Residual left unallocated");
            }
            AllocationEvent::FellBack { reason } => {
                warn!(%reason, "Tiered allocation failed, using optimized allocation");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AllocationObserver for NoopObserver {
    fn on_event(&mut self, _event: &AllocationEvent) {}
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<AllocationEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any recorded event matches the predicate
    pub fn any(&self, predicate: impl Fn(&AllocationEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}

impl AllocationObserver for RecordingObserver {
    fn on_event(&mut self, event: &AllocationEvent) {
        self.events.push(event.clone());
    }
}
