//! Requests submitted to the engine.

use serde::{Deserialize, Serialize};

use crate::types::{ChampionId, SeatId, Team};

/// A typed request against a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Lock a champion for the active picking team
    LockPick {
        /// Team claiming the turn
        team: Team,
        /// Seat issuing the pick
        seat_id: SeatId,
        /// Champion to lock in
        champion_id: ChampionId,
    },
    /// Ban a champion for the active banning team
    BanChampion {
        /// Team claiming the turn
        team: Team,
        /// Seat issuing the ban
        seat_id: SeatId,
        /// Champion to ban
        champion_id: ChampionId,
    },
    /// Record a seat's transient selection intent
    HoverChampion {
        /// Team claiming the turn
        team: Team,
        /// Seat whose hover is recorded
        seat_id: SeatId,
        /// Hovered champion
        champion_id: ChampionId,
    },
    /// The clock for the active step ran out
    TimeoutAdvance {
        /// Seat whose hover, if any, is locked in
        seat_id: SeatId,
    },
    /// Begin the draft clock. Not handled by the engine.
    StartGame,
}

impl Command {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LockPick { .. } => "LockPick",
            Self::BanChampion { .. } => "BanChampion",
            Self::HoverChampion { .. } => "HoverChampion",
            Self::TimeoutAdvance { .. } => "TimeoutAdvance",
            Self::StartGame => "StartGame",
        }
    }

    /// Command the turn timer issues on expiry.
    pub fn timeout() -> Self {
        Self::TimeoutAdvance { seat_id: SeatId::unassigned() }
    }
}
