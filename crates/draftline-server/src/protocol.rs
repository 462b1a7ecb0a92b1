//! JSON envelopes exchanged with WebSocket clients.
//!
//! Outbound traffic is a [`ServerMessage`], tagged by `type`. Inbound text
//! frames decode into a [`ClientMessage`] and are then narrowed to an engine
//! [`Command`]. Only `LockPick`, `BanChampion` and `HoverChampion` are
//! accepted from clients; timeouts are synthesized by the lobby clock.

use draftline_core::{ChampionId, Command, DraftState, SeatId, Team};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server to client envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full state after a successful mutation, or on join
    StateSnapshot {
        /// Strictly increasing per lobby
        version: u64,
        /// Settled draft state
        state: DraftState,
    },
    /// Rejection of the recipient's own command
    Error {
        /// Human-readable reason
        error: String,
    },
}

impl ServerMessage {
    /// Snapshot envelope.
    pub fn snapshot(version: u64, state: DraftState) -> Self {
        Self::StateSnapshot { version, state }
    }

    /// Error envelope carrying the display form of `err`.
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error { error: err.to_string() }
    }

    /// Version for snapshots, `None` for errors.
    pub fn version(&self) -> Option<u64> {
        match self {
            Self::StateSnapshot { version, .. } => Some(*version),
            Self::Error { .. } => None,
        }
    }
}

/// Client to server message as it appears on the wire.
///
/// Fields are loosely typed so that an unknown `type` or `team` is reported
/// as such instead of as malformed JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    /// Command name
    #[serde(rename = "type")]
    pub kind: String,
    /// `"blue"` or `"red"`
    #[serde(default)]
    pub team: String,
    /// Seat issuing the command
    #[serde(default)]
    pub seat_id: SeatId,
    /// Target champion
    #[serde(default)]
    pub champion_id: ChampionId,
}

/// Inbound frames the adapter refuses to forward.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Not valid JSON, or missing `type`
    #[error("bad json: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `type` is not a client command
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// `team` is neither blue nor red
    #[error("unknown team: {0}")]
    UnknownTeam(String),

    /// Binary frames are not part of the protocol
    #[error("binary frames are not supported")]
    Binary,
}

impl ClientMessage {
    /// Narrow to an engine command.
    pub fn into_command(self) -> Result<Command, ProtocolError> {
        let Some(team) = Team::from_name(&self.team) else {
            return Err(ProtocolError::UnknownTeam(self.team));
        };
        let Self { kind, seat_id, champion_id, .. } = self;

        match kind.as_str() {
            "LockPick" => Ok(Command::LockPick { team, seat_id, champion_id }),
            "BanChampion" => Ok(Command::BanChampion { team, seat_id, champion_id }),
            "HoverChampion" => Ok(Command::HoverChampion { team, seat_id, champion_id }),
            _ => Err(ProtocolError::UnknownType(kind)),
        }
    }
}

/// Decode one inbound text frame.
pub fn decode_command(text: &str) -> Result<Command, ProtocolError> {
    serde_json::from_str::<ClientMessage>(text)?.into_command()
}
