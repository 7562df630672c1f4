//! Stake allocation engine
//!
//! Turns each player's declared maximum into a set of two-party pairings
//! where both teams commit the same total.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PREPARATION                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Session (teams + declarations)                             │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  Validation → OutlierCapper (opt-in)                        │
//! │       → CapPreferenceApplier → round to unit                │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ALLOCATION                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TieredPlanner ──(error)──► OptimizedPlanner                │
//! │       │                          │                          │
//! │       ▼                          ▼                          │
//! │  per-player targets                                         │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  PairingMatcher → Consolidator → StakePlan                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`StakeCalculator`]: Entry point; owns the fallback decision
//! - [`AllocationPlanner`]: Trait implemented by [`TieredPlanner`] and [`OptimizedPlanner`]
//! - [`PairingMatcher`]: Converts targets into [`StakePair`](crate::common::types::StakePair)s
//! - [`Consolidator`]: Merges pairings between the same two players
//! - [`StakePlan`]: Pairs plus the per-player report
//!
//! # Example
//!
//! ```ignore
//! use stake_allocator::{EngineConfig, StakeCalculator, StakeInput};
//!
//! let calculator = StakeCalculator::new(EngineConfig::default());
//! let plan = calculator.compute(
//!     &["p1".into()],
//!     &["p2".into(), "p3".into()],
//!     &[StakeInput::new("p1", 100), StakeInput::new("p2", 60), StakeInput::new("p3", 60)],
//! )?;
//! for pair in &plan.pairs {
//!     println!("{pair}");
//! }
//! ```

pub mod calculator;
pub mod capping;
pub mod consolidate;
pub mod drift;
pub mod matcher;
pub mod optimized;
pub mod outliers;
pub mod tiered;
pub mod traits;
pub mod types;

pub use calculator::StakeCalculator;
pub use capping::CapPreferenceApplier;
pub use consolidate::Consolidator;
pub use matcher::PairingMatcher;
pub use optimized::OptimizedPlanner;
pub use outliers::OutlierCapper;
pub use tiered::TieredPlanner;
pub use traits::{AllocationPlanner, BoxedPlanner};
pub use types::{
    Allocation, AllocationTarget, Entrant, FallbackReason, PlayerAllocation, Roster, StakePlan,
    Strategy, LOW_TIER_LIMIT,
};

/// Planner implementing `strategy`
pub fn planner_for(strategy: Strategy) -> BoxedPlanner {
    match strategy {
        Strategy::Tiered => Box::new(TieredPlanner),
        Strategy::Optimized => Box::new(OptimizedPlanner),
    }
}
