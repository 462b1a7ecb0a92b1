//! Property-based tests for the draft engine
//!
//! Random command streams are driven through `apply` + `settle` and the
//! resulting state is checked against the draft invariants after every step.

use std::collections::HashSet;

use draftline_core::{
    Action, ChampionId, Command, DRAFT_LEN, DraftError, DraftEvent, DraftState, RandomSelector,
    Phase, Rules, SeatId, Team, apply, reduce,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Champion ids drawn by the generators. Small enough that collisions (and so
/// rejections) are common.
const POOL: u32 = 30;

#[derive(Debug, Clone)]
enum Op {
    /// Lock or ban (whichever the step wants) for the active team
    Act(u32),
    /// Same, but claiming the other team's turn
    OutOfTurn(u32),
    /// Hover for the active team from one of two seats
    Hover { seat: bool, champion: u32 },
    /// The clock ran out
    Timeout,
    /// Not an engine command
    Start,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (1..=POOL).prop_map(Op::Act),
        1 => (1..=POOL).prop_map(Op::OutOfTurn),
        2 => (any::<bool>(), 1..=POOL).prop_map(|(seat, champion)| Op::Hover { seat, champion }),
        2 => Just(Op::Timeout),
        1 => Just(Op::Start),
    ]
}

fn to_command(state: &DraftState, op: &Op) -> Option<Command> {
    let step = state.current_step()?;
    let seat_id = SeatId::default();

    Some(match *op {
        Op::Act(c) | Op::OutOfTurn(c) => {
            let team = if matches!(op, Op::OutOfTurn(_)) { step.team.other() } else { step.team };
            let champion_id = ChampionId(c);
            match step.action {
                Action::Pick => Command::LockPick { team, seat_id, champion_id },
                Action::Ban => Command::BanChampion { team, seat_id, champion_id },
            }
        },
        Op::Hover { seat, champion } => Command::HoverChampion {
            team: step.team,
            seat_id: if seat { SeatId::unassigned() } else { SeatId::from("other") },
            champion_id: ChampionId(champion),
        },
        Op::Timeout => Command::timeout(),
        Op::Start => Command::StartGame,
    })
}

fn fearless_set(raw: &[u32]) -> Vec<ChampionId> {
    raw.iter().copied().map(ChampionId).collect()
}

/// Check the invariants that must hold between any two commands.
fn check_invariants(state: &DraftState) -> Result<(), TestCaseError> {
    prop_assert!(state.cursor <= DRAFT_LEN);
    prop_assert_eq!(state.phase, Phase::from_cursor(state.cursor));

    let mut seen = HashSet::new();
    for champion in state.picks.iter().chain(state.bans.iter()) {
        prop_assert!(seen.insert(champion), "champion {} appears twice", champion);
    }

    for champion in state.bans.iter() {
        prop_assert!(!state.fearless.contains(&champion), "fearless champion {} banned", champion);
    }

    if state.rules.fearless {
        for champion in state.picks.iter() {
            prop_assert!(!state.fearless.contains(&champion));
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: picks/bans stay unique, cursor only moves forward, and the
    /// event log replays to the same picks, bans and cursor.
    #[test]
    fn prop_random_drafts_hold_invariants_and_replay(
        seed in any::<u64>(),
        fearless_on in any::<bool>(),
        fearless in prop::collection::vec(1..=POOL, 0..5),
        ops in prop::collection::vec(op(), 0..80),
    ) {
        let rules = Rules { fearless: fearless_on, ..Rules::default() };
        let mut state = DraftState::with_rules(rules).with_fearless(fearless_set(&fearless));
        let mut selector =
            RandomSelector::with_rng((1..=POOL).map(ChampionId), ChaCha8Rng::seed_from_u64(seed));
        let mut log: Vec<DraftEvent> = Vec::new();

        for op in &ops {
            let Some(command) = to_command(&state, op) else { break };
            let before = state.clone();

            match apply(&state, &command, &mut selector) {
                Ok(transition) => {
                    let touches_pool = transition.events.iter().any(|e| matches!(
                        e,
                        DraftEvent::ChampionPicked { .. } | DraftEvent::ChampionBanned { .. }
                    ));
                    log.extend(transition.events.iter().copied());
                    state = transition.settled();

                    prop_assert!(state.cursor >= before.cursor);
                    if touches_pool {
                        for hovered in state.hover.values() {
                            prop_assert!(!state.is_picked(*hovered) && !state.is_banned(*hovered));
                        }
                    }
                },
                Err(_) => prop_assert_eq!(&state, &before),
            }

            check_invariants(&state)?;
        }

        let replayed = reduce(&log);
        prop_assert_eq!(&replayed.picks, &state.picks);
        prop_assert_eq!(&replayed.bans, &state.bans);
        prop_assert_eq!(replayed.cursor, state.cursor);
        prop_assert_eq!(replayed.phase, state.phase);
    }

    /// Property: an illegal command is rejected the same way every time.
    #[test]
    fn prop_rejection_is_idempotent(
        cursor in 0usize..DRAFT_LEN,
        taken in 1..=POOL,
        wrong_team in any::<bool>(),
    ) {
        let mut state = DraftState::new();
        state.cursor = cursor;
        state.refresh_phase();
        state.bans.blue.push(ChampionId(taken));

        let step = state.current_step().unwrap();
        let team = if wrong_team { step.team.other() } else { step.team };
        let (seat_id, champion_id) = (SeatId::default(), ChampionId(taken));
        let command = match step.action {
            Action::Pick => Command::LockPick { team, seat_id, champion_id },
            Action::Ban => Command::BanChampion { team, seat_id, champion_id },
        };

        let mut nothing = |_: &DraftState, _: Team| -> Option<ChampionId> { None };
        let first = apply(&state, &command, &mut nothing);
        let second = apply(&state, &command, &mut nothing);

        let expected = match (wrong_team, step.action) {
            (true, _) => DraftError::WrongTurn,
            (false, Action::Pick) => DraftError::IllegalPick,
            (false, Action::Ban) => DraftError::IllegalBan,
        };
        prop_assert_eq!(first, Err(expected));
        prop_assert_eq!(second, Err(expected));
    }

    /// Property: nothing is accepted once the cursor reaches the end.
    #[test]
    fn prop_completed_draft_is_terminal(ops in prop::collection::vec(op(), 1..20)) {
        let mut state = DraftState::new();
        state.cursor = DRAFT_LEN;
        state.refresh_phase();
        let mut nothing = |_: &DraftState, _: Team| -> Option<ChampionId> { None };

        for op in &ops {
            let command = match op {
                Op::Timeout => Command::timeout(),
                Op::Start => Command::StartGame,
                Op::Act(c) | Op::OutOfTurn(c) | Op::Hover { champion: c, .. } => Command::LockPick {
                    team: Team::Blue,
                    seat_id: SeatId::default(),
                    champion_id: ChampionId(*c),
                },
            };
            prop_assert_eq!(
                apply(&state, &command, &mut nothing),
                Err(DraftError::GameAlreadyCompleted)
            );
        }
    }
}
