//! Draft session state and the legality rules evaluated against it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    event::DraftEvent,
    turn_order::{DRAFT_LEN, Phase, TurnStep, step_at},
    types::{ChampionId, SeatId, Team},
};

/// Default pick and ban clock, in seconds.
pub const DEFAULT_TIMER_SECS: i64 = 25;

/// Per-session rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    /// Exclude `fearless` champions from picks
    pub fearless: bool,
    /// Pick step clock in seconds. `<= 0` disables the timer.
    pub pick_timer_sec: i64,
    /// Ban step clock in seconds. `<= 0` disables the timer.
    pub ban_timer_sec: i64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            fearless: false,
            pick_timer_sec: DEFAULT_TIMER_SECS,
            ban_timer_sec: DEFAULT_TIMER_SECS,
        }
    }
}

/// Ordered champion lists for both teams. Insertion order is draft order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSlots {
    /// Blue side, in draft order
    pub blue: Vec<ChampionId>,
    /// Red side, in draft order
    pub red: Vec<ChampionId>,
}

impl TeamSlots {
    /// Champions for one team.
    pub fn team(&self, team: Team) -> &[ChampionId] {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }

    /// Append a champion to a team's list.
    pub fn push(&mut self, team: Team, champion: ChampionId) {
        match team {
            Team::Blue => self.blue.push(champion),
            Team::Red => self.red.push(champion),
        }
    }

    /// Whether either team holds the champion.
    pub fn contains(&self, champion: ChampionId) -> bool {
        self.blue.contains(&champion) || self.red.contains(&champion)
    }

    /// Total entries across both teams.
    pub fn len(&self) -> usize {
        self.blue.len() + self.red.len()
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.blue.is_empty() && self.red.is_empty()
    }

    /// All entries, blue first.
    pub fn iter(&self) -> impl Iterator<Item = ChampionId> + '_ {
        self.blue.iter().chain(self.red.iter()).copied()
    }
}

/// Live state of one draft.
///
/// Owned exclusively by a single lobby actor. The engine never mutates a
/// state in place; it returns a new value that the owner installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// Derived from `cursor`; kept for viewers
    pub phase: Phase,
    /// Index of the active step in the turn order
    pub cursor: usize,
    /// Locked picks per team
    pub picks: TeamSlots,
    /// Bans per team
    pub bans: TeamSlots,
    /// Champions used in earlier games of the series
    pub fearless: BTreeSet<ChampionId>,
    /// Transient intent per seat; never replayed from the event log
    pub hover: BTreeMap<SeatId, ChampionId>,
    /// Rule set for this draft
    pub rules: Rules,
}

impl Default for DraftState {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftState {
    /// Empty draft at cursor 0 with default rules.
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Empty draft at cursor 0.
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            phase: Phase::from_cursor(0),
            cursor: 0,
            picks: TeamSlots::default(),
            bans: TeamSlots::default(),
            fearless: BTreeSet::new(),
            hover: BTreeMap::new(),
            rules,
        }
    }

    /// Replace the fearless exclusion set.
    #[must_use]
    pub fn with_fearless(mut self, champions: impl IntoIterator<Item = ChampionId>) -> Self {
        self.fearless = champions.into_iter().collect();
        self
    }

    /// Active step, or `None` once the draft is complete.
    pub fn current_step(&self) -> Option<TurnStep> {
        step_at(self.cursor)
    }

    /// Whether every step has been played.
    pub fn is_complete(&self) -> bool {
        self.cursor >= DRAFT_LEN
    }

    /// Whether `champion` was picked by either team.
    pub fn is_picked(&self, champion: ChampionId) -> bool {
        self.picks.contains(champion)
    }

    /// Whether `champion` was banned by either team.
    pub fn is_banned(&self, champion: ChampionId) -> bool {
        self.bans.contains(champion)
    }

    /// Not banned, not picked, and not fearless-excluded while fearless
    /// mode is on.
    pub fn is_pickable(&self, champion: ChampionId) -> bool {
        if self.is_banned(champion) || self.is_picked(champion) {
            return false;
        }

        !(self.rules.fearless && self.fearless.contains(&champion))
    }

    /// Not fearless-excluded (regardless of the flag), not banned, not
    /// picked.
    pub fn is_bannable(&self, champion: ChampionId) -> bool {
        !self.fearless.contains(&champion) && !self.is_banned(champion) && !self.is_picked(champion)
    }

    /// Recompute `phase` from `cursor`.
    pub fn refresh_phase(&mut self) {
        self.phase = Phase::from_cursor(self.cursor);
    }

    /// Post-apply housekeeping for accepted events.
    ///
    /// Advances the cursor once per `TurnAdvanced` (never past the end of
    /// the turn order), drops hover entries that point at a champion that was
    /// just picked or banned, then recomputes the phase.
    ///
    /// Any pick or ban also reconciles the whole hover table, so entries
    /// that were already stale when they were recorded go away too.
    pub fn settle(&mut self, events: &[DraftEvent]) {
        let mut reconcile = false;

        for event in events {
            match event {
                DraftEvent::TurnAdvanced => {
                    self.cursor = (self.cursor + 1).min(DRAFT_LEN);
                },
                DraftEvent::ChampionPicked { champion_id, .. }
                | DraftEvent::ChampionBanned { champion_id, .. } => {
                    self.hover.retain(|_, hovered| hovered != champion_id);
                    reconcile = true;
                },
                DraftEvent::TimerStarted
                | DraftEvent::TimerExpired
                | DraftEvent::GameCompleted => {},
            }
        }

        if reconcile {
            let (picks, bans) = (&self.picks, &self.bans);
            self.hover.retain(|_, hovered| !picks.contains(*hovered) && !bans.contains(*hovered));
        }

        self.refresh_phase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<ChampionId> {
        raw.iter().copied().map(ChampionId).collect()
    }

    fn red_pick_state() -> DraftState {
        let mut state = DraftState::new();
        state.cursor = 7;
        state.picks.blue = ids(&[266]);
        state.bans.blue = ids(&[1, 2, 3]);
        state.bans.red = ids(&[4, 5, 6]);
        state
    }

    #[test]
    fn legal_pick() {
        assert!(red_pick_state().is_pickable(ChampionId(15)));
    }

    #[test]
    fn pick_blocked_by_prior_pick() {
        assert!(!red_pick_state().is_pickable(ChampionId(266)));
    }

    #[test]
    fn pick_blocked_by_ban() {
        assert!(!red_pick_state().is_pickable(ChampionId(4)));
    }

    #[test]
    fn pick_blocked_by_fearless_only_when_enabled() {
        let mut state = red_pick_state().with_fearless(ids(&[222, 251, 45]));
        assert!(state.is_pickable(ChampionId(222)));

        state.rules.fearless = true;
        assert!(!state.is_pickable(ChampionId(222)));
        assert!(state.is_pickable(ChampionId(15)));
    }

    #[test]
    fn ban_blocked_by_fearless_regardless_of_flag() {
        let state = red_pick_state().with_fearless(ids(&[222]));
        assert!(!state.rules.fearless);
        assert!(!state.is_bannable(ChampionId(222)));
    }

    #[test]
    fn ban_blocked_by_pick_and_ban() {
        let state = red_pick_state();
        assert!(!state.is_bannable(ChampionId(266)));
        assert!(!state.is_bannable(ChampionId(1)));
        assert!(state.is_bannable(ChampionId(7)));
    }

    #[test]
    fn settle_purges_stale_hovers() {
        let mut state = red_pick_state();
        state.hover.insert(SeatId::from("red-1"), ChampionId(15));
        state.hover.insert(SeatId::from("red-2"), ChampionId(15));
        state.hover.insert(SeatId::from("blue-1"), ChampionId(64));

        state.picks.push(Team::Red, ChampionId(15));
        state.settle(&[
            DraftEvent::ChampionPicked { team: Team::Red, champion_id: ChampionId(15) },
            DraftEvent::TurnAdvanced,
        ]);

        assert_eq!(state.cursor, 8);
        assert_eq!(state.hover.len(), 1);
        assert_eq!(state.hover.get(&SeatId::from("blue-1")), Some(&ChampionId(64)));
    }

    #[test]
    fn settle_never_moves_cursor_past_end() {
        let mut state = DraftState::new();
        state.cursor = DRAFT_LEN - 1;
        state.settle(&[DraftEvent::TurnAdvanced, DraftEvent::TurnAdvanced]);

        assert_eq!(state.cursor, DRAFT_LEN);
        assert_eq!(state.phase, Phase::Done);
    }

    #[test]
    fn new_state_starts_in_ban1() {
        let state = DraftState::new();
        assert_eq!(state.phase, Phase::Ban1);
        assert_eq!(state.cursor, 0);
        assert!(state.picks.is_empty());
        assert!(state.bans.is_empty());
        assert_eq!(state.rules, Rules::default());
    }
}
