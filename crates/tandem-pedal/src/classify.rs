use tandem_netproto::Foot;

use crate::intake::TapEvent;
use crate::state::LastTap;

/// How a single tap relates to the rhythm so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Same foot as this role's previous tap.
    WrongFoot,
    /// Alternates for this role but mirrors the partner's last foot.
    InPhase,
    /// Alternates for this role and opposes the partner (or the partner has not tapped).
    AntiPhase,
}

/// Classify a tap against its own role's last tap and the partner's last tap.
///
/// A role's first tap has no previous foot, so it can only be in- or anti-phase.
pub fn classify(foot: Foot, own: Option<LastTap>, other: Option<LastTap>) -> TapOutcome {
    if own.is_some_and(|last| last.foot == foot) {
        return TapOutcome::WrongFoot;
    }
    match other {
        Some(last) if last.foot == foot => TapOutcome::InPhase,
        _ => TapOutcome::AntiPhase,
    }
}

/// Both roles pushed the same pedal at (nearly) the same moment.
pub fn is_crank_fight(first: &TapEvent, second: &TapEvent, window: f64) -> bool {
    first.role != second.role
        && first.foot == second.foot
        && (first.timestamp - second.timestamp).abs() < window
}

#[cfg(test)]
mod tests {
    use tandem_netproto::Role;

    use super::*;

    fn last(foot: Foot) -> Option<LastTap> {
        Some(LastTap { foot, time: 0.0 })
    }

    #[test]
    fn first_tap_is_never_wrong_foot() {
        assert_eq!(classify(Foot::A, None, None), TapOutcome::AntiPhase);
        assert_eq!(classify(Foot::A, None, last(Foot::A)), TapOutcome::InPhase);
        assert_eq!(classify(Foot::A, None, last(Foot::B)), TapOutcome::AntiPhase);
    }

    #[test]
    fn repeating_own_foot_wins_over_partner() {
        assert_eq!(
            classify(Foot::B, last(Foot::B), last(Foot::A)),
            TapOutcome::WrongFoot
        );
        assert_eq!(
            classify(Foot::B, last(Foot::B), None),
            TapOutcome::WrongFoot
        );
    }

    #[test]
    fn alternating_is_judged_against_partner() {
        assert_eq!(
            classify(Foot::B, last(Foot::A), last(Foot::B)),
            TapOutcome::InPhase
        );
        assert_eq!(
            classify(Foot::B, last(Foot::A), last(Foot::A)),
            TapOutcome::AntiPhase
        );
    }

    #[test]
    fn crank_fight_needs_both_roles_same_foot_inside_window() {
        let tap = |role, foot, timestamp| TapEvent {
            role,
            foot,
            timestamp,
        };
        let a = tap(Role::Captain, Foot::A, 1.0);
        assert!(is_crank_fight(&a, &tap(Role::Stoker, Foot::A, 1.05), 0.1));
        assert!(is_crank_fight(&a, &tap(Role::Stoker, Foot::A, 0.95), 0.1));
        assert!(!is_crank_fight(&a, &tap(Role::Stoker, Foot::A, 1.1), 0.1));
        assert!(!is_crank_fight(&a, &tap(Role::Stoker, Foot::B, 1.0), 0.1));
        assert!(!is_crank_fight(&a, &tap(Role::Captain, Foot::A, 1.0), 0.1));
    }
}
