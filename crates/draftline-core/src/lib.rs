//! Draftline draft engine.
//!
//! A pure, deterministic state machine for a two-team champion ban/pick
//! draft. It knows the fixed 20-step turn order, the legality rules for picks
//! and bans (including fearless exclusions), and which events each accepted
//! command produces.
//!
//! # Architecture
//!
//! The engine performs no I/O and owns no state. Callers hold a
//! [`DraftState`] and feed it through [`apply`], getting back either a
//! [`Transition`] (events plus provisional next state) or a [`DraftError`].
//! The lobby actor in `draftline-server` is the only production caller; it
//! serializes access so that exactly one `apply` runs per session at a time.
//!
//! [`reduce`] is the replay path: folding the events of every accepted
//! command reproduces the picks, bans and cursor of the live state.
//!
//! # Components
//!
//! - [`turn_order`]: the fixed step sequence and [`Phase`] derivation
//! - [`state`]: [`DraftState`], [`Rules`] and legality checks
//! - [`engine`]: [`apply`] and [`reduce`]
//! - [`select`]: [`ChampionSelector`] for forced picks on timeout

#![forbid(unsafe_code)]

pub mod command;
pub mod engine;
pub mod error;
pub mod event;
pub mod select;
pub mod state;
pub mod turn_order;
pub mod types;

pub use command::Command;
pub use engine::{Transition, apply, reduce};
pub use error::DraftError;
pub use event::DraftEvent;
pub use select::{ChampionSelector, RandomSelector};
pub use state::{DEFAULT_TIMER_SECS, DraftState, Rules, TeamSlots};
pub use turn_order::{DRAFT_LEN, Phase, TURN_ORDER, TurnStep, step_at};
pub use types::{Action, ChampionId, SeatId, Team};
