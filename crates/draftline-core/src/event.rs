//! Historical facts emitted by the engine.
//!
//! Events are the only input [`crate::reduce`] accepts, so every change to
//! picks, bans or the cursor must be expressed as one of these variants.
//! Hovers are intent, not history, and never appear here.

use serde::{Deserialize, Serialize};

use crate::types::{ChampionId, Team};

/// A fact appended to a session's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DraftEvent {
    /// A champion was locked in
    ChampionPicked {
        /// Team that picked
        team: Team,
        /// Champion locked in
        champion_id: ChampionId,
    },
    /// A champion was banned
    ChampionBanned {
        /// Team that banned
        team: Team,
        /// Champion removed from the pool
        champion_id: ChampionId,
    },
    /// The cursor moved to the next step
    TurnAdvanced,
    /// A turn clock started
    TimerStarted,
    /// A turn clock ran out
    TimerExpired,
    /// The final step was played
    GameCompleted,
}

impl DraftEvent {
    /// Whether this event ends the draft.
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::GameCompleted)
    }

    /// Whether this event moves the cursor.
    pub fn is_turn_advance(&self) -> bool {
        matches!(self, Self::TurnAdvanced)
    }
}
