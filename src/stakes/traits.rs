use crate::common::errors::Result;
use crate::common::traits::AllocationObserver;
use crate::config::types::EngineConfig;
use crate::stakes::types::{Allocation, Roster, Strategy};

/// Decides how much each player will ultimately wager
///
/// Planners see the roster after outlier, preference and rounding
/// adjustments. They never pair players; that is the matcher's job.
///
/// # Implementation Notes
///
/// - `plan` must be deterministic for a given roster and config
/// - Every target must be a multiple of the rounding unit and at most the
///   entrant's effective max
/// - Any error aborts the plan; the caller decides whether to fall back
pub trait AllocationPlanner: Send + Sync {
    /// Strategy this planner implements
    fn strategy(&self) -> Strategy;

    /// Compute per-player targets
    fn plan(
        &self,
        roster: &Roster,
        config: &EngineConfig,
        observer: &mut dyn AllocationObserver,
    ) -> Result<Allocation>;
}

/// Boxed planner for dynamic dispatch
pub type BoxedPlanner = Box<dyn AllocationPlanner>;
