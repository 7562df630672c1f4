use crate::common::traits::{AllocationEvent, AllocationObserver};
use crate::common::types::TeamSide;
use crate::stakes::types::Roster;

/// Applies each player's opt-in cap before allocation
///
/// A capped player's max is clamped to the highest max on the opposing
/// team. Both team highs are read once, before any player is clamped.
pub struct CapPreferenceApplier;

impl CapPreferenceApplier {
    pub fn apply(roster: &mut Roster, observer: &mut dyn AllocationObserver) {
        let highest_a = roster.highest(TeamSide::A);
        let highest_b = roster.highest(TeamSide::B);

        for entrant in roster.entrants_mut() {
            if !entrant.is_capped {
                continue;
            }
            let cap = match entrant.team {
                TeamSide::A => highest_b,
                TeamSide::B => highest_a,
            };
            if entrant.effective_max > cap {
                observer.on_event(&AllocationEvent::PreferenceCapped {
                    player_id: entrant.player_id.clone(),
                    from: entrant.effective_max,
                    to: cap,
                });
                entrant.effective_max = cap;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::NoopObserver;
    use crate::stakes::types::Entrant;

    #[test]
    fn test_capped_player_limited_to_opposing_high() {
        let mut roster = Roster::new(
            vec![Entrant::new("p1", TeamSide::A, 200).capped(), Entrant::new("p2", TeamSide::A, 20)],
            vec![Entrant::new("p3", TeamSide::B, 50), Entrant::new("p4", TeamSide::B, 100)],
        );

        CapPreferenceApplier::apply(&mut roster, &mut NoopObserver);

        assert_eq!(roster.team_a[0].effective_max, 100);
        assert_eq!(roster.team_a[0].declared_max, 200);
    }

    #[test]
    fn test_uncapped_player_untouched() {
        let mut roster = Roster::new(
            vec![Entrant::new("p1", TeamSide::A, 200)],
            vec![Entrant::new("p2", TeamSide::B, 50)],
        );

        CapPreferenceApplier::apply(&mut roster, &mut NoopObserver);

        assert_eq!(roster.team_a[0].effective_max, 200);
    }

    #[test]
    fn test_highs_read_before_clamping() {
        // Both top bettors are capped; each is clamped to the other's original max
        let mut roster = Roster::new(
            vec![Entrant::new("p1", TeamSide::A, 300).capped()],
            vec![Entrant::new("p2", TeamSide::B, 100).capped(), Entrant::new("p3", TeamSide::B, 20)],
        );

        CapPreferenceApplier::apply(&mut roster, &mut NoopObserver);

        assert_eq!(roster.team_a[0].effective_max, 100);
        assert_eq!(roster.team_b[0].effective_max, 100);
    }
}
