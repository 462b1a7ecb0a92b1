//! Server error types.

use thiserror::Error;

/// Errors surfaced by the lobby runtime, the registry and the transports.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The lobby actor is gone (shut down or cancelled).
    ///
    /// Sends to a stopped actor fail with this. Callers holding a stale
    /// handle should drop it and look the lobby up again.
    #[error("lobby {0} is closed")]
    LobbyClosed(String),

    /// The registry actor is gone.
    ///
    /// Only happens after [`crate::RegistryHandle::shutdown`] or runtime
    /// teardown. Fatal for the caller.
    #[error("lobby registry is closed")]
    RegistryClosed,

    /// No lobby registered under this code.
    #[error("lobby not found: {0}")]
    LobbyNotFound(String),

    /// OS randomness unavailable while generating a code or id.
    #[error("randomness unavailable: {0}")]
    Random(String),

    /// Every generated lobby code was already taken.
    #[error("no free lobby code after {0} attempts")]
    CodesExhausted(usize),

    /// Invalid configuration (bind address, capacities).
    ///
    /// Fatal at startup. Fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Listener or socket I/O error.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl From<getrandom::Error> for ServerError {
    fn from(err: getrandom::Error) -> Self {
        Self::Random(err.to_string())
    }
}
