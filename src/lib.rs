//! StakeAllocator Library
//!
//! Pairwise stake allocation for two-team draft sessions: every player
//! declares a maximum, and the engine produces player-vs-player pairings
//! where both teams wager the same total.

pub mod common;
pub mod config;
pub mod stakes;

// Re-export commonly used types
pub use common::errors::{Result, StakeError};
pub use common::traits::{AllocationEvent, AllocationObserver, NoopObserver, RecordingObserver, TracingObserver};
pub use common::types::{SessionInput, StakeInput, StakePair, TeamSide};
pub use crate::config::types::{AppConfig, EngineConfig};

// Engine types
pub use stakes::{
    planner_for, AllocationPlanner, BoxedPlanner, Consolidator, FallbackReason, OptimizedPlanner,
    PairingMatcher, PlayerAllocation, StakeCalculator, StakePlan, Strategy, TieredPlanner,
};
