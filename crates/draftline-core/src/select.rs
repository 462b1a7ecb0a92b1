//! Champion selection for expired pick clocks.
//!
//! When a pick timer runs out and the seat never hovered anything, the engine
//! asks a [`ChampionSelector`] for a champion. Production uses
//! [`RandomSelector`]; tests inject closures or a seeded RNG so auto-picks are
//! reproducible.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    state::DraftState,
    types::{ChampionId, Team},
};

/// Chooses a champion for a forced pick.
///
/// Implementations should only return champions that are pickable in
/// `state`. The engine re-checks legality and rejects the auto-pick with
/// `IllegalPick` if they don't.
pub trait ChampionSelector {
    /// Champion to lock in for `team`, or `None` if nothing is available.
    fn select(&mut self, state: &DraftState, team: Team) -> Option<ChampionId>;
}

impl<F> ChampionSelector for F
where
    F: FnMut(&DraftState, Team) -> Option<ChampionId>,
{
    fn select(&mut self, state: &DraftState, team: Team) -> Option<ChampionId> {
        self(state, team)
    }
}

/// Uniform draw from the legal subset of a fixed champion pool.
#[derive(Debug, Clone)]
pub struct RandomSelector<R = StdRng> {
    pool: Vec<ChampionId>,
    rng: R,
}

impl RandomSelector<StdRng> {
    /// Selector over `pool`, seeded from OS entropy.
    pub fn new(pool: impl IntoIterator<Item = ChampionId>) -> Self {
        Self::with_rng(pool, StdRng::from_entropy())
    }

    /// Selector over champion ids `1..=max_id`.
    pub fn contiguous(max_id: u32) -> Self {
        Self::new((1..=max_id).map(ChampionId))
    }
}

impl<R: Rng> RandomSelector<R> {
    /// Selector over `pool` drawing from `rng`.
    pub fn with_rng(pool: impl IntoIterator<Item = ChampionId>, rng: R) -> Self {
        let mut pool: Vec<ChampionId> = pool.into_iter().collect();
        pool.sort_unstable();
        pool.dedup();
        Self { pool, rng }
    }

    /// Pool entries that are currently pickable.
    pub fn legal_candidates(&self, state: &DraftState) -> Vec<ChampionId> {
        self.pool.iter().copied().filter(|c| state.is_pickable(*c)).collect()
    }
}

impl<R: Rng> ChampionSelector for RandomSelector<R> {
    fn select(&mut self, state: &DraftState, team: Team) -> Option<ChampionId> {
        let candidates = self.legal_candidates(state);
        let choice = candidates.choose(&mut self.rng).copied();

        tracing::trace!(%team, candidates = candidates.len(), ?choice, "auto-pick selection");

        choice
    }
}
