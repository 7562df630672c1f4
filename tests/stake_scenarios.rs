//! End-to-end allocation scenarios
//!
//! Each test drives the public `StakeCalculator` with a full session and
//! checks the resulting pairs and per-player report.

mod common;

use common::{all_minimum_session, default_calculator, ids, mismatch_session, session, session_files, stakes, symmetric_session};
use pretty_assertions::assert_eq;
use stake_allocator::config::types::EngineConfig;
use stake_allocator::stakes::OutlierCapper;
use stake_allocator::{
    AllocationEvent, FallbackReason, RecordingObserver, SessionInput, StakeCalculator, StakeError, StakePair, Strategy,
    TeamSide,
};

// ============================================================================
// Reference scenarios
// ============================================================================

#[test_log::test]
fn test_symmetric_teams_pair_exactly() {
    let plan = default_calculator().compute_session(&symmetric_session()).unwrap();

    assert_eq!(plan.strategy, Strategy::Tiered);
    assert_eq!(plan.pairs, vec![StakePair::new("P1", "P3", 100), StakePair::new("P2", "P4", 50)]);
    assert_eq!(plan.shortfalls().count(), 0);
}

#[test_log::test]
fn test_capacity_mismatch_splits_larger_bet() {
    let plan = default_calculator().compute_session(&mismatch_session()).unwrap();

    let p1_pairs: Vec<&StakePair> = plan.pairs_for("P1").collect();
    assert_eq!(p1_pairs.len(), 2);
    assert_eq!(p1_pairs.iter().map(|p| p.amount).sum::<u64>(), 100);
    assert_eq!(plan.team_total(TeamSide::A), 100);
    assert_eq!(plan.team_total(TeamSide::B), 100);
    assert!(plan.pairs.iter().all(|p| p.amount >= 10));
}

#[test]
fn test_outlier_bound_uses_integer_quartiles() {
    // sorted [10, 10, 10, 1000]: q1 = 10, q3 = 1000, bound = 1000 + 1.5 * 990
    let bound = OutlierCapper::upper_bound(&[10, 10, 10, 1000]).unwrap();
    assert_eq!(bound, 2485);
    assert_eq!(1000u64.min(bound), 1000);
}

#[test]
fn test_outlier_capped_before_allocation() {
    let calculator = StakeCalculator::new(EngineConfig::default().with_outlier_capping(true));
    let mut observer = RecordingObserver::new();

    let plan = calculator
        .compute_with_observer(
            &ids(&["P1", "P2", "P3"]),
            &ids(&["P4", "P5"]),
            &stakes(&[("P1", 10), ("P2", 10), ("P3", 10), ("P4", 1000), ("P5", 10)]),
            &mut observer,
        )
        .unwrap();

    assert!(observer.any(|e| matches!(
        e,
        AllocationEvent::OutlierCapped { player_id, from: 1000, to: 10 } if player_id == "P4"
    )));
    assert_eq!(plan.allocation_for("P4").unwrap().effective_max, 10);
    assert_eq!(plan.team_total(TeamSide::A), 20);
    assert_eq!(plan.team_total(TeamSide::B), 20);
}

#[test]
fn test_outlier_capping_off_by_default() {
    let plan = default_calculator()
        .compute_session(&session(&[("P1", 10), ("P2", 10), ("P3", 10)], &[("P4", 1000), ("P5", 10)]))
        .unwrap();

    assert_eq!(plan.allocation_for("P4").unwrap().effective_max, 1000);
}

#[test]
fn test_all_players_at_minimum() {
    let plan = default_calculator().compute_session(&all_minimum_session()).unwrap();

    assert_eq!(
        plan.pairs,
        vec![
            StakePair::new("P1", "P4", 10),
            StakePair::new("P2", "P5", 10),
            StakePair::new("P3", "P6", 10),
        ]
    );
    assert!(plan.allocations.iter().all(|a| a.paired == 10));
}

// ============================================================================
// Fallback
// ============================================================================

#[test]
fn test_tiered_infeasible_falls_back_to_optimized() {
    let session = session(&[("P1", 10)], &[("P2", 50), ("P3", 50)]);

    let tiered = default_calculator().compute_session(&session).unwrap();
    let optimized = StakeCalculator::new(EngineConfig::default().with_strategy(Strategy::Optimized))
        .compute_session(&session)
        .unwrap();

    assert_eq!(tiered.strategy, Strategy::Optimized);
    assert!(matches!(tiered.fallback, Some(FallbackReason::Infeasible { .. })));
    assert_eq!(tiered.pairs, optimized.pairs);
}

// ============================================================================
// Session files
// ============================================================================

#[test_log::test]
fn test_draft_pod_session_file() {
    let session: SessionInput = serde_json::from_str(session_files::DRAFT_POD).unwrap();

    let plan = default_calculator().compute_session(&session).unwrap();

    // alice is capped at dave's 100, then tier-capped to 90
    let alice = plan.allocation_for("alice").unwrap();
    assert_eq!(alice.declared_max, 200);
    assert_eq!(alice.effective_max, 100);
    assert_eq!(alice.paired, 90);
    // bob's second declaration wins
    assert_eq!(plan.allocation_for("bob").unwrap().declared_max, 40);

    assert!(plan.pairs.contains(&StakePair::new("alice", "dave", 90)));
    assert!(plan.pairs.contains(&StakePair::new("bob", "erin", 40)));
    assert_eq!(plan.team_total(TeamSide::A), 160);
    assert!(plan.is_balanced());
}

#[test]
fn test_empty_team_session_file_fails_fast() {
    let session: SessionInput = serde_json::from_str(session_files::EMPTY_TEAM).unwrap();

    let err = default_calculator().compute_session(&session).unwrap_err();

    assert_eq!(err, StakeError::EmptyTeam(TeamSide::B));
    assert!(err.is_fail_fast());
}

#[test]
fn test_plan_serializes_with_provenance() {
    let plan = default_calculator().compute_session(&symmetric_session()).unwrap();

    let value = serde_json::to_value(&plan).unwrap();

    assert_eq!(value["strategy"], "tiered");
    assert!(value["fallback"].is_null());
    assert_eq!(value["pairs"][0]["player_a_id"], "P1");
    assert_eq!(value["allocations"][0]["team"], "a");
}
