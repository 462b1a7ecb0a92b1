//! Fixed tournament turn order and the phases derived from it.
//!
//! The sequence is process-wide configuration, never per-session state. A
//! session only stores its cursor into [`TURN_ORDER`]; the phase is always
//! recomputed from that cursor.

use serde::{Deserialize, Serialize};

use crate::types::{Action, Team};

/// One entry of the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStep {
    /// Team expected to act
    pub team: Team,
    /// Expected action
    pub action: Action,
}

impl TurnStep {
    const fn ban(team: Team) -> Self {
        Self { team, action: Action::Ban }
    }

    const fn pick(team: Team) -> Self {
        Self { team, action: Action::Pick }
    }
}

/// Number of steps in a draft. `cursor == DRAFT_LEN` means complete.
pub const DRAFT_LEN: usize = 20;

/// The 20-step ban/pick order.
pub const TURN_ORDER: [TurnStep; DRAFT_LEN] = [
    // ban phase 1
    TurnStep::ban(Team::Blue),
    TurnStep::ban(Team::Red),
    TurnStep::ban(Team::Blue),
    TurnStep::ban(Team::Red),
    TurnStep::ban(Team::Blue),
    TurnStep::ban(Team::Red),
    // pick phase 1
    TurnStep::pick(Team::Blue),
    TurnStep::pick(Team::Red),
    TurnStep::pick(Team::Red),
    TurnStep::pick(Team::Blue),
    TurnStep::pick(Team::Blue),
    TurnStep::pick(Team::Red),
    // ban phase 2
    TurnStep::ban(Team::Red),
    TurnStep::ban(Team::Blue),
    TurnStep::ban(Team::Red),
    TurnStep::ban(Team::Blue),
    // pick phase 2
    TurnStep::pick(Team::Red),
    TurnStep::pick(Team::Blue),
    TurnStep::pick(Team::Blue),
    TurnStep::pick(Team::Red),
];

/// Step at `cursor`, or `None` once the draft is complete.
pub fn step_at(cursor: usize) -> Option<TurnStep> {
    TURN_ORDER.get(cursor).copied()
}

/// Draft phase, a pure function of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Steps 0..=5
    #[default]
    Ban1,
    /// Steps 6..=11
    Pick1,
    /// Steps 12..=15
    Ban2,
    /// Steps 16..=19
    Pick2,
    /// Cursor reached the end of the turn order
    Done,
}

impl Phase {
    /// Phase for a cursor position. Boundaries are the last step of each
    /// phase: 5, 11, 15 and 19.
    pub fn from_cursor(cursor: usize) -> Self {
        match cursor {
            0..=5 => Self::Ban1,
            6..=11 => Self::Pick1,
            12..=15 => Self::Ban2,
            16..=19 => Self::Pick2,
            _ => Self::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_matches_tournament_order() {
        assert_eq!(step_at(1), Some(TurnStep::ban(Team::Red)));
        assert_eq!(step_at(7), Some(TurnStep::pick(Team::Red)));
        assert_eq!(step_at(9), Some(TurnStep::pick(Team::Blue)));
        assert_eq!(step_at(14), Some(TurnStep::ban(Team::Red)));
        assert_eq!(step_at(19), Some(TurnStep::pick(Team::Red)));
        assert_eq!(step_at(DRAFT_LEN), None);
    }

    #[test]
    fn each_team_bans_five_and_picks_five() {
        for team in Team::ALL {
            let bans = TURN_ORDER.iter().filter(|s| s.team == team && s.action == Action::Ban);
            let picks = TURN_ORDER.iter().filter(|s| s.team == team && s.action == Action::Pick);
            assert_eq!(bans.count(), 5);
            assert_eq!(picks.count(), 5);
        }
    }

    #[test]
    fn phase_follows_cursor_ranges() {
        assert_eq!(Phase::from_cursor(0), Phase::Ban1);
        assert_eq!(Phase::from_cursor(3), Phase::Ban1);
        assert_eq!(Phase::from_cursor(5), Phase::Ban1);
        assert_eq!(Phase::from_cursor(6), Phase::Pick1);
        assert_eq!(Phase::from_cursor(11), Phase::Pick1);
        assert_eq!(Phase::from_cursor(14), Phase::Ban2);
        assert_eq!(Phase::from_cursor(18), Phase::Pick2);
        assert_eq!(Phase::from_cursor(DRAFT_LEN), Phase::Done);
        assert_eq!(Phase::from_cursor(usize::MAX), Phase::Done);
    }

    #[test]
    fn phase_actions_are_homogeneous() {
        for (cursor, step) in TURN_ORDER.iter().enumerate() {
            let expected = match Phase::from_cursor(cursor) {
                Phase::Ban1 | Phase::Ban2 => Action::Ban,
                Phase::Pick1 | Phase::Pick2 => Action::Pick,
                Phase::Done => unreachable!("cursor {cursor} is inside the turn order"),
            };
            assert_eq!(step.action, expected, "cursor {cursor}");
        }
    }
}
