//! Identifiers and small value types shared by the engine and its callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One side of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Blue side (first ban, first pick)
    Blue,
    /// Red side
    Red,
}

impl Team {
    /// Both teams, blue first.
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    /// Parse the lowercase wire name (`"blue"` / `"red"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blue" => Some(Self::Blue),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => f.write_str("blue"),
            Self::Red => f.write_str("red"),
        }
    }
}

/// What the active team does on a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Remove a champion from the pool
    Ban,
    /// Lock a champion in for the team
    Pick,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ban => f.write_str("ban"),
            Self::Pick => f.write_str("pick"),
        }
    }
}

/// Champion identifier as used by the game client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChampionId(pub u32);

impl fmt::Display for ChampionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChampionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Participant slot within a team. Distinct from a connection id.
///
/// The empty seat id is what the turn timer uses when it synthesizes a
/// timeout; seats are not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub String);

impl SeatId {
    /// Seat id carried by timer-synthesized commands.
    pub fn unassigned() -> Self {
        Self(String::new())
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeatId {
    fn from(seat: &str) -> Self {
        Self(seat.to_owned())
    }
}

impl From<String> for SeatId {
    fn from(seat: String) -> Self {
        Self(seat)
    }
}
