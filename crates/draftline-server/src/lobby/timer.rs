//! Generation-fenced turn clock.
//!
//! Each arm bumps a generation counter and spawns a sleeper that, on expiry,
//! posts `TimerFired { generation }` back into the lobby inbox. The lobby
//! compares the carried generation with [`TurnTimer::generation`] and drops
//! anything stale, so a fire that was already queued when the clock was
//! rearmed can never advance the wrong step.
//!
//! The sleeper holds only a weak sender: a pending clock never keeps a lobby
//! alive.

use std::time::Duration;

use tokio::{sync::mpsc::WeakSender, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use super::LobbyMsg;

/// Turn clock owned by a single lobby actor.
#[derive(Debug)]
pub(crate) struct TurnTimer {
    generation: u64,
    task: Option<JoinHandle<()>>,
    inbox: WeakSender<LobbyMsg>,
    cancel: CancellationToken,
}

impl TurnTimer {
    pub(crate) fn new(inbox: WeakSender<LobbyMsg>, cancel: CancellationToken) -> Self {
        Self { generation: 0, task: None, inbox, cancel }
    }

    /// Generation of the most recent arm or disarm.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a fire carrying `generation` belongs to the live clock.
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Stop any running clock and start a new one. Returns the new generation.
    pub(crate) fn arm(&mut self, duration: Duration) -> u64 {
        self.abort_task();
        self.generation += 1;

        let generation = self.generation;
        let inbox = self.inbox.clone();
        let cancel = self.cancel.clone();

        self.task = Some(tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {},
                () = tokio::time::sleep(duration) => {
                    let Some(inbox) = inbox.upgrade() else { return };
                    tokio::select! {
                        () = cancel.cancelled() => {},
                        result = inbox.send(LobbyMsg::TimerFired { generation }) => {
                            if result.is_err() {
                                tracing::trace!(generation, "lobby gone before timer delivery");
                            }
                        },
                    }
                },
            }
        }));

        generation
    }

    /// Stop the clock.
    ///
    /// Also bumps the generation, which fences out a fire that was already
    /// sitting in the inbox.
    pub(crate) fn disarm(&mut self) {
        self.abort_task();
        self.generation += 1;
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_with_current_generation() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = TurnTimer::new(tx.downgrade(), CancellationToken::new());

        let generation = timer.arm(Duration::from_secs(25));
        assert_eq!(generation, 1);

        tokio::time::sleep(Duration::from_secs(26)).await;
        match rx.try_recv() {
            Ok(LobbyMsg::TimerFired { generation }) => assert!(timer.is_current(generation)),
            other => panic!("expected TimerFired, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_pending_clock() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = TurnTimer::new(tx.downgrade(), CancellationToken::new());

        timer.arm(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(5)).await;
        let second = timer.arm(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(rx.try_recv().is_err(), "first clock should have been stopped");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(LobbyMsg::TimerFired { generation }) if generation == second
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_fences_queued_fire() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut timer = TurnTimer::new(tx.downgrade(), CancellationToken::new());

        timer.arm(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        timer.disarm();

        match rx.try_recv() {
            Ok(LobbyMsg::TimerFired { generation }) => assert!(!timer.is_current(generation)),
            other => panic!("expected TimerFired, got {other:?}"),
        }
        assert_eq!(timer.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_suppresses_delivery() {
        let (tx, mut rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();
        let mut timer = TurnTimer::new(tx.downgrade(), cancel.clone());

        timer.arm(Duration::from_secs(3));
        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(rx.try_recv().is_err());
    }
}
