//! Engine rejection reasons.

use thiserror::Error;

/// Why `apply` refused a command.
///
/// Every variant is an expected, recoverable outcome. The state the command
/// was applied to is never modified.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    /// Command's team or action does not match the active step
    #[error("invalid turn")]
    WrongTurn,

    /// Champion is banned, already picked, or fearless-excluded
    #[error("illegal champion")]
    IllegalPick,

    /// Champion is fearless-excluded, already banned, or already picked
    #[error("illegal ban")]
    IllegalBan,

    /// Command kind is not handled by the engine
    #[error("unsupported command")]
    UnsupportedCommand,

    /// Every step has been played
    #[error("game already completed")]
    GameAlreadyCompleted,
}
