//! Per-connection outboxes for one lobby.
//!
//! Delivery never blocks the actor: every send is a `try_send`, and a
//! connection whose outbox is full or closed is dropped on the spot. Dropping
//! the sender is what ends the connection's writer task.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::ConnectionId;
use crate::protocol::ServerMessage;

/// Outbound queue for one connection.
pub type Outbox = mpsc::Sender<ServerMessage>;

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Sent,
    /// Outbox was full; the connection was dropped
    Saturated,
    /// Receiver already gone; the connection was dropped
    Closed,
    /// No such connection
    Unknown,
}

#[derive(Debug, Default)]
pub(crate) struct Fanout {
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Fanout {
    /// Register `outbox`. A previous outbox under the same id is replaced
    /// (and thereby closed).
    pub(crate) fn insert(&mut self, connection: ConnectionId, outbox: Outbox) {
        if self.outboxes.insert(connection, outbox).is_some() {
            tracing::debug!(%connection, "connection re-joined, previous outbox closed");
        }
    }

    /// Deregister. Returns whether the connection was known.
    pub(crate) fn remove(&mut self, connection: ConnectionId) -> bool {
        self.outboxes.remove(&connection).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub(crate) fn send_to(&mut self, connection: ConnectionId, message: ServerMessage) -> Delivery {
        let Some(outbox) = self.outboxes.get(&connection) else {
            return Delivery::Unknown;
        };

        match outbox.try_send(message) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(%connection, "outbox full, dropping slow connection");
                self.outboxes.remove(&connection);
                Delivery::Saturated
            },
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(%connection, "outbox closed, dropping connection");
                self.outboxes.remove(&connection);
                Delivery::Closed
            },
        }
    }

    /// Deliver `message` to every connection. Returns the ids that were
    /// dropped along the way.
    pub(crate) fn broadcast(&mut self, message: &ServerMessage) -> Vec<ConnectionId> {
        let targets: Vec<ConnectionId> = self.outboxes.keys().copied().collect();

        targets
            .into_iter()
            .filter(|connection| self.send_to(*connection, message.clone()) != Delivery::Sent)
            .collect()
    }

    /// Drop every outbox, ending every connection's stream.
    pub(crate) fn close_all(&mut self) {
        self.outboxes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: &str) -> ServerMessage {
        ServerMessage::Error { error: text.to_owned() }
    }

    #[test]
    fn saturated_outbox_is_dropped_without_affecting_others() {
        let mut fanout = Fanout::default();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        fanout.insert(ConnectionId(1), slow_tx);
        fanout.insert(ConnectionId(2), fast_tx);

        assert!(fanout.broadcast(&note("first")).is_empty());
        assert_eq!(fanout.broadcast(&note("second")), vec![ConnectionId(1)]);

        assert_eq!(fanout.len(), 1);
        assert_eq!(fast_rx.try_recv().unwrap(), note("first"));
        assert_eq!(fast_rx.try_recv().unwrap(), note("second"));
    }

    #[test]
    fn closed_outbox_is_dropped() {
        let mut fanout = Fanout::default();
        let (tx, rx) = mpsc::channel(1);
        fanout.insert(ConnectionId(9), tx);
        drop(rx);

        assert_eq!(fanout.send_to(ConnectionId(9), note("x")), Delivery::Closed);
        assert_eq!(fanout.len(), 0);
    }

    #[test]
    fn unknown_connection() {
        let mut fanout = Fanout::default();
        assert_eq!(fanout.send_to(ConnectionId(3), note("x")), Delivery::Unknown);
        assert!(!fanout.remove(ConnectionId(3)));
    }

    #[test]
    fn remove_closes_stream() {
        let mut fanout = Fanout::default();
        let (tx, mut rx) = mpsc::channel(1);
        fanout.insert(ConnectionId(4), tx);

        assert!(fanout.remove(ConnectionId(4)));
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }
}
