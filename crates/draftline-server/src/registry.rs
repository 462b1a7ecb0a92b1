//! Lobby registry: code → lobby handle, owned by one actor.
//!
//! Creation goes through the registry task, so two concurrent
//! `get_or_create` calls for the same code always resolve to the same lobby.
//! Every lobby runs under a child of the registry's cancellation token;
//! shutting the registry down stops all of them.

use std::collections::HashMap;

use draftline_core::{DraftState, RandomSelector};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{
    error::ServerError,
    lobby::{DEFAULT_INBOX_CAPACITY, Lobby, LobbyConfig, LobbyHandle},
};

/// Default size of the auto-pick champion pool (ids `1..=N`).
pub const DEFAULT_CHAMPION_POOL: u32 = 170;

/// Registry settings, applied to every lobby it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Per-lobby sizing
    pub lobby: LobbyConfig,
    /// Auto-picks draw from champion ids `1..=champion_pool`
    pub champion_pool: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { lobby: LobbyConfig::default(), champion_pool: DEFAULT_CHAMPION_POOL }
    }
}

#[derive(Debug)]
enum RegistryMsg {
    GetOrCreate { code: String, initial: DraftState, reply: oneshot::Sender<LobbyHandle> },
    CreateNew { code: String, initial: DraftState, reply: oneshot::Sender<Option<LobbyHandle>> },
    Get { code: String, reply: oneshot::Sender<Option<LobbyHandle>> },
    Remove { code: String, reply: oneshot::Sender<bool> },
    Shutdown,
}

/// Cloneable address of the registry actor.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    tx: mpsc::Sender<RegistryMsg>,
    config: RegistryConfig,
    cancel: CancellationToken,
}

impl RegistryHandle {
    /// Handle to the lobby under `code`, creating it from `initial` if absent.
    ///
    /// `initial` is ignored when the lobby already exists.
    pub async fn get_or_create(
        &self,
        code: &str,
        initial: DraftState,
    ) -> Result<LobbyHandle, ServerError> {
        self.request(|reply| RegistryMsg::GetOrCreate { code: code.to_owned(), initial, reply })
            .await
    }

    /// Create a lobby under `code` only if the code is free.
    ///
    /// Returns `None` on collision.
    pub async fn create(
        &self,
        code: &str,
        initial: DraftState,
    ) -> Result<Option<LobbyHandle>, ServerError> {
        self.request(|reply| RegistryMsg::CreateNew { code: code.to_owned(), initial, reply }).await
    }

    /// Handle to a live lobby. `None` if unknown or already stopped.
    pub async fn get(&self, code: &str) -> Result<Option<LobbyHandle>, ServerError> {
        self.request(|reply| RegistryMsg::Get { code: code.to_owned(), reply }).await
    }

    /// Forget `code` and stop its lobby. Returns whether it was registered.
    pub async fn remove(&self, code: &str) -> Result<bool, ServerError> {
        self.request(|reply| RegistryMsg::Remove { code: code.to_owned(), reply }).await
    }

    /// Stop the registry and every lobby it created.
    pub async fn shutdown(&self) {
        if self.tx.send(RegistryMsg::Shutdown).await.is_err() {
            tracing::trace!("shutdown sent to stopped registry");
        }
    }

    /// Settings applied to new lobbies.
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Token cancelled when the registry stops.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn request<T>(
        &self,
        msg: impl FnOnce(oneshot::Sender<T>) -> RegistryMsg,
    ) -> Result<T, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(msg(reply)).await.map_err(|_| ServerError::RegistryClosed)?;
        rx.await.map_err(|_| ServerError::RegistryClosed)
    }
}

/// The registry actor.
pub struct Registry {
    inbox: mpsc::Receiver<RegistryMsg>,
    lobbies: HashMap<String, LobbyHandle>,
    config: RegistryConfig,
    cancel: CancellationToken,
}

impl Registry {
    /// Start the registry under a child of `parent`.
    pub fn spawn(config: RegistryConfig, parent: &CancellationToken) -> RegistryHandle {
        let (tx, inbox) = mpsc::channel(DEFAULT_INBOX_CAPACITY);
        let cancel = parent.child_token();

        let registry =
            Self { inbox, lobbies: HashMap::new(), config, cancel: cancel.clone() };
        tokio::spawn(registry.run());

        RegistryHandle { tx, config, cancel }
    }

    async fn run(mut self) {
        tracing::info!("lobby registry started");

        loop {
            let msg = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                msg = self.inbox.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            match msg {
                RegistryMsg::GetOrCreate { code, initial, reply } => {
                    let handle = match self.live(&code) {
                        Some(handle) => handle,
                        None => self.spawn_lobby(code, initial),
                    };
                    reply_or_trace(reply, handle);
                },

                RegistryMsg::CreateNew { code, initial, reply } => {
                    let created = if self.live(&code).is_some() {
                        tracing::debug!(lobby = %code, "lobby code collision");
                        None
                    } else {
                        Some(self.spawn_lobby(code, initial))
                    };
                    reply_or_trace(reply, created);
                },

                RegistryMsg::Get { code, reply } => {
                    reply_or_trace(reply, self.live(&code));
                },

                RegistryMsg::Remove { code, reply } => {
                    let removed = self.lobbies.remove(&code);
                    if let Some(handle) = &removed {
                        handle.cancellation().cancel();
                        tracing::info!(lobby = %code, "lobby removed");
                    }
                    reply_or_trace(reply, removed.is_some());
                },

                RegistryMsg::Shutdown => break,
            }
        }

        self.cancel.cancel();
        let count = self.lobbies.len();
        self.lobbies.clear();
        tracing::info!(lobbies = count, "lobby registry stopped");
    }

    /// Registered handle for `code`, pruning it if the lobby has stopped.
    fn live(&mut self, code: &str) -> Option<LobbyHandle> {
        let handle = self.lobbies.get(code)?;
        if handle.is_closed() {
            tracing::debug!(lobby = %code, "pruning stopped lobby");
            self.lobbies.remove(code);
            return None;
        }
        Some(handle.clone())
    }

    fn spawn_lobby(&mut self, code: String, initial: DraftState) -> LobbyHandle {
        let selector = RandomSelector::contiguous(self.config.champion_pool);
        let handle = Lobby::spawn(
            code.as_str(),
            initial,
            selector,
            self.config.lobby,
            self.cancel.child_token(),
        );

        tracing::info!(lobby = %code, "lobby created");
        self.lobbies.insert(code, handle.clone());
        handle
    }
}

fn reply_or_trace<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        tracing::trace!("registry requester went away");
    }
}
