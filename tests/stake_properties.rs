//! Property tests for plan invariants over random sessions

use std::collections::HashSet;

use proptest::prelude::*;
use stake_allocator::config::types::EngineConfig;
use stake_allocator::{Consolidator, FallbackReason, SessionInput, StakeCalculator, StakeInput, StakePlan};

/// Up to six players per team, maxima in multiples of the unit, some opted in to capping
fn team_strategy(prefix: &'static str, unit: u64) -> impl Strategy<Value = Vec<(String, u64, bool)>> {
    prop::collection::vec((1u64..=50u64, prop::bool::weighted(0.2)), 1..=6).prop_map(move |players| {
        players
            .into_iter()
            .enumerate()
            .map(|(i, (units, capped))| (format!("{prefix}{i}"), units * unit, capped))
            .collect()
    })
}

fn build_session(team_a: &[(String, u64, bool)], team_b: &[(String, u64, bool)]) -> SessionInput {
    let declarations = team_a
        .iter()
        .chain(team_b)
        .map(|(p, max, capped)| {
            let stake = StakeInput::new(p.as_str(), *max);
            if *capped {
                stake.capped()
            } else {
                stake
            }
        })
        .collect();
    SessionInput::new(
        team_a.iter().map(|(p, _, _)| p.clone()).collect(),
        team_b.iter().map(|(p, _, _)| p.clone()).collect(),
        declarations,
    )
}

fn check_plan(plan: &StakePlan, session: &SessionInput, unit: u64) -> Result<(), TestCaseError> {
    let team_a: HashSet<&str> = session.team_a.iter().map(String::as_str).collect();
    let team_b: HashSet<&str> = session.team_b.iter().map(String::as_str).collect();

    // Every pair is one A member against one B member
    for pair in &plan.pairs {
        prop_assert!(team_a.contains(pair.player_a_id.as_str()), "{pair}");
        prop_assert!(team_b.contains(pair.player_b_id.as_str()), "{pair}");
        prop_assert!(pair.amount >= unit && pair.amount % unit == 0, "{pair}");
    }

    let total: u64 = plan.pairs.iter().map(|p| p.amount).sum();
    prop_assert_eq!(plan.team_total(stake_allocator::TeamSide::A), total);
    prop_assert_eq!(plan.team_total(stake_allocator::TeamSide::B), total);

    for allocation in &plan.allocations {
        prop_assert!(allocation.paired <= allocation.target, "{allocation:?}");
        prop_assert!(allocation.target <= allocation.effective_max, "{allocation:?}");
        prop_assert!(allocation.effective_max <= allocation.declared_max, "{allocation:?}");
    }

    let keys: HashSet<(&str, &str)> = plan.pairs.iter().map(|p| p.key()).collect();
    prop_assert_eq!(keys.len(), plan.pairs.len());
    prop_assert_eq!(Consolidator::consolidate(&plan.pairs), plan.pairs.clone());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    /// Tiered (with fallback) keeps every plan invariant
    #[test]
    fn pbt_tiered_plan_invariants(
        team_a in team_strategy("a", 10),
        team_b in team_strategy("b", 10),
        cap_outliers in any::<bool>(),
    ) {
        let session = build_session(&team_a, &team_b);
        let calculator = StakeCalculator::new(EngineConfig::default().with_outlier_capping(cap_outliers));

        let plan = calculator.compute_session(&session).unwrap();

        check_plan(&plan, &session, 10)?;
    }

    /// Optimized keeps every plan invariant, at a coarser unit too
    #[test]
    fn pbt_optimized_plan_invariants(
        team_a in team_strategy("a", 5),
        team_b in team_strategy("b", 5),
    ) {
        let session = build_session(&team_a, &team_b);
        let config = EngineConfig::new(5, 10, stake_allocator::Strategy::Optimized);

        let plan = StakeCalculator::new(config).compute_session(&session).unwrap();

        prop_assert!(plan.fallback.is_none());
        check_plan(&plan, &session, 5)?;
    }

    /// An infeasible tiered plan produces exactly the optimized pairs
    #[test]
    fn pbt_fallback_matches_optimized(
        team_a in team_strategy("a", 10),
        team_b in team_strategy("b", 10),
    ) {
        let session = build_session(&team_a, &team_b);
        let tiered = StakeCalculator::new(EngineConfig::default()).compute_session(&session).unwrap();

        if let Some(FallbackReason::Infeasible { .. }) = tiered.fallback {
            let optimized = StakeCalculator::new(
                EngineConfig::default().with_strategy(stake_allocator::Strategy::Optimized),
            )
            .compute_session(&session)
            .unwrap();
            prop_assert_eq!(tiered.pairs, optimized.pairs);
        }
    }

    /// Same session, same plan
    #[test]
    fn pbt_plans_are_deterministic(
        team_a in team_strategy("a", 10),
        team_b in team_strategy("b", 10),
    ) {
        let session = build_session(&team_a, &team_b);
        let calculator = StakeCalculator::new(EngineConfig::default());

        prop_assert_eq!(
            calculator.compute_session(&session).unwrap(),
            calculator.compute_session(&session).unwrap()
        );
    }
}
