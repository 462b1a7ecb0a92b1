//! The draft state machine.
//!
//! [`apply`] maps `(state, command)` to the events the command produces and
//! the provisional next state, or to a [`DraftError`]. [`reduce`] folds an
//! event log back into a state. Neither touches anything outside its
//! arguments apart from the injected [`ChampionSelector`].
//!
//! # Provisional state
//!
//! The state returned by `apply` carries the new picks, bans and hovers but
//! keeps the old cursor. The owner installs it and then runs
//! [`DraftState::settle`] over the same events, which is where the cursor
//! moves and stale hovers are dropped. [`Transition::settled`] does both.

use crate::{
    command::Command,
    error::DraftError,
    event::DraftEvent,
    select::ChampionSelector,
    state::DraftState,
    turn_order::{DRAFT_LEN, Phase, TurnStep},
    types::{Action, ChampionId, SeatId, Team},
};

/// Result of an accepted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Events to append to the session log, in order
    pub events: Vec<DraftEvent>,
    /// Provisional next state (cursor not yet advanced)
    pub next: DraftState,
}

impl Transition {
    /// Next state after housekeeping.
    pub fn settled(self) -> DraftState {
        let mut next = self.next;
        next.settle(&self.events);
        next
    }

    /// Whether the command ended the draft.
    pub fn completes_game(&self) -> bool {
        self.events.iter().any(DraftEvent::is_completion)
    }

    /// Whether the command moved the draft to another step.
    pub fn advances_turn(&self) -> bool {
        self.events.iter().any(DraftEvent::is_turn_advance)
    }
}

/// Apply `command` to `state`.
///
/// On error `state` is untouched and no events are produced; the caller keeps
/// its current state.
pub fn apply(
    state: &DraftState,
    command: &Command,
    selector: &mut impl ChampionSelector,
) -> Result<Transition, DraftError> {
    let Some(step) = state.current_step() else {
        return Err(DraftError::GameAlreadyCompleted);
    };

    match command {
        Command::LockPick { team, champion_id, .. } => {
            expect_turn(step, *team, Action::Pick)?;
            if !state.is_pickable(*champion_id) {
                return Err(DraftError::IllegalPick);
            }
            Ok(lock(state, step, *champion_id, None))
        },

        Command::BanChampion { team, champion_id, .. } => {
            expect_turn(step, *team, Action::Ban)?;
            if !state.is_bannable(*champion_id) {
                return Err(DraftError::IllegalBan);
            }
            Ok(lock(state, step, *champion_id, None))
        },

        // Hovering is only meaningful while picking.
        Command::HoverChampion { team, seat_id, champion_id } => {
            expect_turn(step, *team, Action::Pick)?;

            let mut next = state.clone();
            next.hover.insert(seat_id.clone(), *champion_id);
            Ok(Transition { events: Vec::new(), next })
        },

        Command::TimeoutAdvance { seat_id } => timeout(state, step, seat_id, selector),

        Command::StartGame => Err(DraftError::UnsupportedCommand),
    }
}

/// Rebuild a state from its event log, starting from an empty draft.
///
/// Hovers, rules and the fearless set are not part of the log and come back
/// empty/default. The phase is recomputed from the final cursor, so a
/// `GameCompleted` without the matching cursor does not mark the draft done.
pub fn reduce<'a>(events: impl IntoIterator<Item = &'a DraftEvent>) -> DraftState {
    let mut state = DraftState::new();

    for event in events {
        match event {
            DraftEvent::ChampionPicked { team, champion_id } => {
                state.picks.push(*team, *champion_id);
            },
            DraftEvent::ChampionBanned { team, champion_id } => {
                state.bans.push(*team, *champion_id);
            },
            DraftEvent::TurnAdvanced => state.cursor += 1,
            DraftEvent::GameCompleted => state.phase = Phase::Done,
            DraftEvent::TimerStarted | DraftEvent::TimerExpired => {},
        }
    }

    state.refresh_phase();
    state
}

fn expect_turn(step: TurnStep, team: Team, action: Action) -> Result<(), DraftError> {
    if step.team == team && step.action == action { Ok(()) } else { Err(DraftError::WrongTurn) }
}

/// Commit `champion` for the active step. Legality is checked by the caller.
fn lock(
    state: &DraftState,
    step: TurnStep,
    champion: ChampionId,
    consumed_hover: Option<&SeatId>,
) -> Transition {
    let mut next = state.clone();

    let mut events = Vec::with_capacity(3);
    match step.action {
        Action::Pick => {
            next.picks.push(step.team, champion);
            events.push(DraftEvent::ChampionPicked { team: step.team, champion_id: champion });
        },
        Action::Ban => {
            next.bans.push(step.team, champion);
            events.push(DraftEvent::ChampionBanned { team: step.team, champion_id: champion });
        },
    }
    events.push(DraftEvent::TurnAdvanced);

    if state.cursor == DRAFT_LEN - 1 {
        events.push(DraftEvent::GameCompleted);
    }

    if let Some(seat) = consumed_hover {
        next.hover.remove(seat);
    }

    Transition { events, next }
}

fn timeout(
    state: &DraftState,
    step: TurnStep,
    seat: &SeatId,
    selector: &mut impl ChampionSelector,
) -> Result<Transition, DraftError> {
    match (state.hover.get(seat).copied(), step.action) {
        // Nobody hovered a ban: the ban is forfeited.
        (None, Action::Ban) => {
            tracing::debug!(
                team = %step.team,
                cursor = state.cursor,
                "ban clock expired, skipping"
            );
            Ok(Transition { events: vec![DraftEvent::TurnAdvanced], next: state.clone() })
        },

        (None, Action::Pick) => {
            let champion = selector
                .select(state, step.team)
                .filter(|c| state.is_pickable(*c))
                .ok_or(DraftError::IllegalPick)?;

            tracing::debug!(
                team = %step.team,
                cursor = state.cursor,
                champion = %champion,
                "pick clock expired without hover, auto-picking"
            );

            Ok(lock(state, step, champion, None))
        },

        (Some(hovered), Action::Ban) => {
            if !state.is_bannable(hovered) {
                return Err(DraftError::IllegalBan);
            }
            Ok(lock(state, step, hovered, Some(seat)))
        },

        (Some(hovered), Action::Pick) => {
            if !state.is_pickable(hovered) {
                return Err(DraftError::IllegalPick);
            }
            Ok(lock(state, step, hovered, Some(seat)))
        },
    }
}
