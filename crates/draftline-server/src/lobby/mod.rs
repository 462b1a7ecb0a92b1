//! Lobby actor: the single writer of one draft session.
//!
//! A lobby is a tokio task draining a bounded inbox of [`LobbyMsg`]. It owns
//! the [`DraftState`], the version counter, the event history, the turn
//! clock and the connection outboxes. Nothing else ever touches them, so
//! there are no locks; callers talk to it through a cloneable
//! [`LobbyHandle`].
//!
//! # Message handling
//!
//! - `Join` registers an outbox and sends the current snapshot to it alone.
//! - `FromClient` runs the command through [`apply`]. A rejection goes back
//!   to the originator as an `Error` envelope and changes nothing. An
//!   accepted command replaces the state, bumps the version and broadcasts a
//!   snapshot; if the turn advanced (and the draft is not over) the clock is
//!   rearmed for the new step.
//! - `TimerFired` with a stale generation is dropped. A current one
//!   synthesizes a timeout and takes the accepted path; if the engine rejects
//!   it, nobody is told.
//! - `Shutdown` (or cancellation of the lobby's token) stops the clock,
//!   closes every outbox and ends the task.
//! - A `Leave` that empties a completed draft also ends the task, so the
//!   registry prunes it on the next lookup.

mod fanout;
mod timer;

use std::{fmt, sync::Arc, time::Duration};

use draftline_core::{Action, ChampionSelector, Command, DraftEvent, DraftState, Transition, apply};
pub use fanout::Outbox;
use fanout::Fanout;
use serde::Serialize;
use timer::TurnTimer;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{error::ServerError, protocol::ServerMessage};

/// Default inbox capacity for a lobby actor.
pub const DEFAULT_INBOX_CAPACITY: usize = 64;

/// Default per-connection outbox capacity.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 16;

/// Sizing for one lobby and its connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyConfig {
    /// Bounded inbox depth for the actor
    pub inbox_capacity: usize,
    /// Bounded outbox depth per connection; a full outbox drops the connection
    pub outbox_capacity: usize,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self { inbox_capacity: DEFAULT_INBOX_CAPACITY, outbox_capacity: DEFAULT_OUTBOX_CAPACITY }
    }
}

/// Transport connection identifier. Not a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Messages accepted by a lobby actor.
#[derive(Debug)]
pub enum LobbyMsg {
    /// Register a connection and send it the current snapshot
    Join {
        /// Connection joining
        connection: ConnectionId,
        /// Where its envelopes go
        outbox: Outbox,
    },
    /// Deregister a connection, closing its outbox
    Leave {
        /// Connection leaving
        connection: ConnectionId,
    },
    /// A decoded command from a connection
    FromClient {
        /// Originator; receives the error envelope on rejection
        connection: ConnectionId,
        /// Command to apply
        command: Command,
    },
    /// The turn clock expired
    TimerFired {
        /// Generation the clock was armed with
        generation: u64,
    },
    /// Introspection
    GetState {
        /// Receives the view
        reply: oneshot::Sender<LobbyView>,
    },
    /// Arm the clock for the current step
    PrimeTimer,
    /// Stop the actor
    Shutdown,
}

/// Point-in-time view of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyView {
    /// Snapshot version; bumped on every accepted mutation
    pub version: u64,
    /// Registered connections
    pub connections: usize,
    /// Generation of the turn clock
    #[serde(skip)]
    pub timer_generation: u64,
    /// Current settled state
    pub state: DraftState,
    /// Every event accepted so far, in order
    #[serde(skip)]
    pub events: Vec<DraftEvent>,
}

/// Cloneable address of a running lobby.
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    code: Arc<str>,
    tx: mpsc::Sender<LobbyMsg>,
    cancel: CancellationToken,
}

impl LobbyHandle {
    /// Lobby code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Enqueue a raw message, waiting for inbox space.
    pub async fn send(&self, msg: LobbyMsg) -> Result<(), ServerError> {
        self.tx.send(msg).await.map_err(|_| self.closed_error())
    }

    /// Register `outbox` under `connection`.
    pub async fn join(&self, connection: ConnectionId, outbox: Outbox) -> Result<(), ServerError> {
        self.send(LobbyMsg::Join { connection, outbox }).await
    }

    /// Deregister `connection`.
    pub async fn leave(&self, connection: ConnectionId) -> Result<(), ServerError> {
        self.send(LobbyMsg::Leave { connection }).await
    }

    /// Submit a command on behalf of `connection`.
    pub async fn submit(
        &self,
        connection: ConnectionId,
        command: Command,
    ) -> Result<(), ServerError> {
        self.send(LobbyMsg::FromClient { connection, command }).await
    }

    /// Current view of the lobby.
    pub async fn state(&self) -> Result<LobbyView, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(LobbyMsg::GetState { reply }).await?;
        rx.await.map_err(|_| self.closed_error())
    }

    /// Start the clock for the current step.
    pub async fn prime_timer(&self) -> Result<(), ServerError> {
        self.send(LobbyMsg::PrimeTimer).await
    }

    /// Ask the lobby to stop. A lobby that is already gone counts as stopped.
    pub async fn shutdown(&self) {
        if self.tx.send(LobbyMsg::Shutdown).await.is_err() {
            tracing::trace!(lobby = %self.code, "shutdown sent to stopped lobby");
        }
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the actor has stopped.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }

    /// Whether both handles address the same actor.
    pub fn same_lobby(&self, other: &LobbyHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Token cancelled when the lobby stops.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn closed_error(&self) -> ServerError {
        ServerError::LobbyClosed(self.code.to_string())
    }
}

/// The actor. Constructed and driven by [`Lobby::spawn`].
pub struct Lobby<S> {
    code: Arc<str>,
    inbox: mpsc::Receiver<LobbyMsg>,
    state: DraftState,
    version: u64,
    events: Vec<DraftEvent>,
    fanout: Fanout,
    timer: TurnTimer,
    selector: S,
    cancel: CancellationToken,
}

impl<S> Lobby<S>
where
    S: ChampionSelector + Send + 'static,
{
    /// Start a lobby task for `initial` and return its handle.
    ///
    /// The lobby stops on `Shutdown`, when `cancel` fires, or when every
    /// handle has been dropped.
    pub fn spawn(
        code: impl Into<Arc<str>>,
        mut initial: DraftState,
        selector: S,
        config: LobbyConfig,
        cancel: CancellationToken,
    ) -> LobbyHandle {
        let code = code.into();
        let (tx, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        initial.refresh_phase();

        let lobby = Self {
            code: Arc::clone(&code),
            inbox,
            state: initial,
            version: 0,
            events: Vec::new(),
            fanout: Fanout::default(),
            timer: TurnTimer::new(tx.downgrade(), cancel.clone()),
            selector,
            cancel: cancel.clone(),
        };
        tokio::spawn(lobby.run());

        LobbyHandle { code, tx, cancel }
    }

    async fn run(mut self) {
        tracing::info!(lobby = %self.code, "lobby started");

        loop {
            let msg = tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                msg = self.inbox.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let leaving = match msg {
                LobbyMsg::Shutdown => break,
                LobbyMsg::Leave { .. } => true,
                _ => false,
            };
            self.handle(msg);

            if leaving && self.is_finished() {
                tracing::info!(lobby = %self.code, "draft done and lobby empty");
                break;
            }
        }

        self.timer.disarm();
        self.fanout.close_all();
        self.cancel.cancel();
        tracing::info!(lobby = %self.code, version = self.version, "lobby stopped");
    }

    fn handle(&mut self, msg: LobbyMsg) {
        match msg {
            LobbyMsg::Join { connection, outbox } => {
                self.fanout.insert(connection, outbox);
                tracing::debug!(lobby = %self.code, %connection, "connection joined");
                self.fanout
                    .send_to(connection, ServerMessage::snapshot(self.version, self.state.clone()));
            },

            LobbyMsg::Leave { connection } => {
                if self.fanout.remove(connection) {
                    tracing::debug!(lobby = %self.code, %connection, "connection left");
                }
            },

            LobbyMsg::FromClient { connection, command } => {
                tracing::trace!(
                    lobby = %self.code,
                    %connection,
                    command = command.kind(),
                    cursor = self.state.cursor,
                    "command received"
                );

                match apply(&self.state, &command, &mut self.selector) {
                    Ok(transition) => self.commit(transition),
                    Err(err) => {
                        tracing::debug!(
                            lobby = %self.code,
                            %connection,
                            command = command.kind(),
                            error = %err,
                            "command rejected"
                        );
                        self.fanout.send_to(connection, ServerMessage::error(err));
                    },
                }
            },

            LobbyMsg::TimerFired { generation } => {
                if !self.timer.is_current(generation) {
                    tracing::trace!(
                        lobby = %self.code,
                        generation,
                        current = self.timer.generation(),
                        "stale timer fire discarded"
                    );
                    return;
                }

                tracing::debug!(
                    lobby = %self.code,
                    generation,
                    cursor = self.state.cursor,
                    "turn timer fired"
                );
                match apply(&self.state, &Command::timeout(), &mut self.selector) {
                    Ok(transition) => self.commit(transition),
                    Err(err) => {
                        tracing::debug!(
                            lobby = %self.code,
                            error = %err,
                            "timeout advance rejected"
                        );
                    },
                }
            },

            LobbyMsg::GetState { reply } => {
                if reply.send(self.view()).is_err() {
                    tracing::trace!(lobby = %self.code, "state requester went away");
                }
            },

            LobbyMsg::PrimeTimer => self.arm_for_current_step(),

            // Handled by the run loop.
            LobbyMsg::Shutdown => {},
        }
    }

    /// Install an accepted transition and publish it.
    fn commit(&mut self, transition: Transition) {
        let completes = transition.completes_game();
        let advances = transition.advances_turn();

        self.events.extend_from_slice(&transition.events);
        self.state = transition.settled();

        if completes {
            self.timer.disarm();
            tracing::info!(lobby = %self.code, "draft completed");
        }

        self.version += 1;
        let dropped =
            self.fanout.broadcast(&ServerMessage::snapshot(self.version, self.state.clone()));
        if !dropped.is_empty() {
            tracing::debug!(
                lobby = %self.code,
                dropped = dropped.len(),
                "connections dropped during broadcast"
            );
        }

        if advances && !completes {
            self.arm_for_current_step();
        }
    }

    fn arm_for_current_step(&mut self) {
        let Some(step) = self.state.current_step() else {
            self.timer.disarm();
            return;
        };

        let secs = match step.action {
            Action::Pick => self.state.rules.pick_timer_sec,
            Action::Ban => self.state.rules.ban_timer_sec,
        };

        if secs <= 0 {
            self.timer.disarm();
            tracing::debug!(
                lobby = %self.code,
                secs,
                cursor = self.state.cursor,
                "turn timer disabled, not arming"
            );
            return;
        }

        let generation = self.timer.arm(Duration::from_secs(secs.unsigned_abs()));
        tracing::debug!(
            lobby = %self.code,
            generation,
            secs,
            cursor = self.state.cursor,
            "turn timer armed"
        );
    }

    /// Completed with nobody left to watch.
    fn is_finished(&self) -> bool {
        self.state.is_complete() && self.fanout.len() == 0
    }

    fn view(&self) -> LobbyView {
        LobbyView {
            version: self.version,
            connections: self.fanout.len(),
            timer_generation: self.timer.generation(),
            state: self.state.clone(),
            events: self.events.clone(),
        }
    }
}
