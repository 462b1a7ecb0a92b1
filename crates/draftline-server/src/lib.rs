//! Draftline draft server.
//!
//! Hosts many concurrent drafts over WebSockets, one actor per lobby, with
//! tokio for the runtime and axum for HTTP and WebSocket transport.
//!
//! # Architecture
//!
//! [`draftline_core`] decides what a command does; this crate decides when it
//! runs and who hears about it. Every lobby is a [`Lobby`] task that
//! serializes all commands for its draft, drives the turn clock and fans
//! snapshots out to connected sockets. A [`Registry`] task maps lobby codes
//! to [`LobbyHandle`]s. The HTTP and WebSocket adapters only translate
//! between the wire and these handles.
//!
//! Shutdown is a tree of cancellation tokens: server → registry → lobby →
//! turn clock.
//!
//! # Components
//!
//! - [`Lobby`] / [`LobbyHandle`]: per-draft actor and its address
//! - [`Registry`] / [`RegistryHandle`]: code → lobby map
//! - [`protocol`]: JSON envelopes
//! - [`http`] / [`ws`]: routes and the socket adapter
//! - [`Server`]: binds a listener and serves the router until cancelled

#![forbid(unsafe_code)]

mod error;
pub mod http;
mod lobby;
pub mod lobby_code;
pub mod protocol;
mod registry;
pub mod ws;

use std::net::SocketAddr;

use draftline_core::Rules;
pub use error::ServerError;
pub use http::{AppState, router};
pub use lobby::{
    ConnectionId, DEFAULT_INBOX_CAPACITY, DEFAULT_OUTBOX_CAPACITY, Lobby, LobbyConfig,
    LobbyHandle, LobbyMsg, LobbyView, Outbox,
};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use registry::{DEFAULT_CHAMPION_POOL, Registry, RegistryConfig, RegistryHandle};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Rules for lobbies created without overrides
    pub rules: Rules,
    /// Auto-picks draw from champion ids `1..=champion_pool`
    pub champion_pool: u32,
    /// Per-lobby inbox depth
    pub inbox_capacity: usize,
    /// Per-connection outbox depth
    pub outbox_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            rules: Rules::default(),
            champion_pool: DEFAULT_CHAMPION_POOL,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Reject settings the runtime cannot honour.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.inbox_capacity == 0 {
            return Err(ServerError::Config("inbox capacity must be non-zero".to_string()));
        }
        if self.outbox_capacity == 0 {
            return Err(ServerError::Config("outbox capacity must be non-zero".to_string()));
        }
        if self.champion_pool == 0 {
            return Err(ServerError::Config("champion pool must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Sizing handed to every lobby.
    pub fn lobby_config(&self) -> LobbyConfig {
        LobbyConfig { inbox_capacity: self.inbox_capacity, outbox_capacity: self.outbox_capacity }
    }

    /// Registry settings derived from this config.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig { lobby: self.lobby_config(), champion_pool: self.champion_pool }
    }
}

/// Production draft server.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    shutdown: CancellationToken,
}

impl Server {
    /// Validate `config` and bind the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let listener = TcpListener::bind(&config.bind_address).await?;

        Ok(Self { listener, config, shutdown: CancellationToken::new() })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Token that stops [`Server::run`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve until the shutdown token is cancelled.
    ///
    /// Cancellation stops every lobby, which closes every socket, and then
    /// waits for in-flight connections to drain.
    pub async fn run(self) -> Result<(), ServerError> {
        let registry = Registry::spawn(self.config.registry_config(), &self.shutdown);
        let app = router(AppState::new(registry.clone(), self.config.rules));

        tracing::info!("Server starting on {}", self.listener.local_addr()?);

        let shutdown = self.shutdown.clone();
        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        registry.shutdown().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ServerConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_capacities_rejected() {
        let config = ServerConfig { inbox_capacity: 0, ..ServerConfig::default() };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));

        let config = ServerConfig { outbox_capacity: 0, ..ServerConfig::default() };
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn derived_configs_follow_server_config() {
        let config = ServerConfig {
            inbox_capacity: 8,
            outbox_capacity: 2,
            champion_pool: 40,
            ..ServerConfig::default()
        };
        let registry = config.registry_config();

        assert_eq!(registry.lobby, LobbyConfig { inbox_capacity: 8, outbox_capacity: 2 });
        assert_eq!(registry.champion_pool, 40);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let server =
            Server::bind(ServerConfig { bind_address: "127.0.0.1:0".into(), ..Default::default() })
                .await
                .unwrap();
        let token = server.shutdown_token();
        let task = tokio::spawn(server.run());

        token.cancel();
        task.await.unwrap().unwrap();
    }
}
