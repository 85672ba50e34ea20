//! Player Session Management
//!
//! One actor task per connected player. The actor owns the player's
//! state exclusively and processes commands strictly in arrival order,
//! which is the concurrency guarantee the engine relies on. Events go
//! out through a broadcast channel; snapshot saves are fire-and-forget
//! with bounded retry so a flaky backend never blocks gameplay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::core::clock::Clock;
use crate::core::rng::{derive_player_seed, DeterministicRng};
use crate::game::command::Command;
use crate::game::engine::Engine;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::state::{PlayerId, PlayerState};
use crate::ports::{Persistence, RankingSink};

/// Session tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Command mailbox depth.
    pub mailbox_capacity: usize,
    /// Event broadcast buffer; slow subscribers lag, never block.
    pub event_capacity: usize,
    /// Snapshot save attempts before giving up.
    pub save_attempts: u32,
    /// First retry delay; doubles per attempt.
    pub save_retry_base: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            event_capacity: 256,
            save_attempts: 5,
            save_retry_base: Duration::from_millis(50),
        }
    }
}

/// Session errors surfaced to callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The actor task is gone.
    #[error("session closed")]
    Closed,

    /// The engine rejected the command.
    #[error("command rejected: {0}")]
    Rejected(#[from] EngineError),
}

enum Request {
    Apply {
        command: Command,
        reply: oneshot::Sender<Result<Vec<DomainEvent>, EngineError>>,
    },
    Snapshot {
        reply: oneshot::Sender<PlayerState>,
    },
    Shutdown,
}

/// Cloneable handle to one player's session actor.
#[derive(Clone)]
pub struct SessionHandle {
    player_id: PlayerId,
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<DomainEvent>,
}

impl SessionHandle {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Apply a command and wait for the engine's verdict.
    pub async fn apply(&self, command: Command) -> Result<Vec<DomainEvent>, SessionError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Apply { command, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)?.map_err(SessionError::from)
    }

    /// Read a consistent copy of the current state.
    pub async fn snapshot(&self) -> Result<PlayerState, SessionError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// Subscribe to the session's event stream. Rejections appear as
    /// `CommandRejected`.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Ask the actor to finish its mailbox and exit.
    pub async fn shutdown(&self) {
        let _ = self.requests.send(Request::Shutdown).await;
    }
}

/// Load or create the player, then spawn their actor.
///
/// The per-player RNG is seeded from the player id, so a session's
/// random draws are reproducible given its command log.
pub async fn spawn_session(
    player_id: PlayerId,
    engine: Arc<Engine>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn Persistence>,
    ranking: Arc<dyn RankingSink>,
    config: SessionConfig,
) -> SessionHandle {
    let state = match store.load(player_id) {
        Ok(Some(state)) => state,
        Ok(None) => PlayerState::new(player_id, clock.now()),
        Err(error) => {
            warn!(player = %player_id.to_uuid_string(), %error, "load failed, starting fresh");
            PlayerState::new(player_id, clock.now())
        }
    };

    let (requests_tx, requests_rx) = mpsc::channel(config.mailbox_capacity);
    let (events_tx, _) = broadcast::channel(config.event_capacity);
    let handle = SessionHandle {
        player_id,
        requests: requests_tx,
        events: events_tx.clone(),
    };

    let rng = DeterministicRng::new(derive_player_seed(player_id.as_bytes()));
    tokio::spawn(run_actor(
        state, rng, engine, clock, store, ranking, config, requests_rx, events_tx,
    ));

    handle
}

#[allow(clippy::too_many_arguments)]
async fn run_actor(
    mut state: PlayerState,
    mut rng: DeterministicRng,
    engine: Arc<Engine>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn Persistence>,
    ranking: Arc<dyn RankingSink>,
    config: SessionConfig,
    mut requests: mpsc::Receiver<Request>,
    events: broadcast::Sender<DomainEvent>,
) {
    let player_id = state.id;
    debug!(player = %player_id.to_uuid_string(), "session started");

    while let Some(request) = requests.recv().await {
        match request {
            Request::Apply { command, reply } => {
                let now = clock.now();
                let mut applied = Vec::new();
                let result = engine.apply(&mut state, &command, now, &mut rng, &mut applied);

                // Housekeeping events broadcast even on rejection, since
                // their effects (passive income, expired bonuses) commit
                // either way.
                for event in &applied {
                    let _ = events.send(event.clone());
                }
                match &result {
                    Ok(()) => ranking.submit(player_id, &state.summary()),
                    Err(error) => {
                        let _ = events.send(DomainEvent::CommandRejected {
                            reason: error.reason().to_string(),
                        });
                    }
                }

                // Housekeeping mutates state even on rejection, so the
                // snapshot is saved either way.
                tokio::spawn(persist_with_retry(
                    store.clone(),
                    player_id,
                    state.clone(),
                    config.save_attempts,
                    config.save_retry_base,
                ));

                let _ = reply.send(result.map(|()| applied));
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(state.clone());
            }
            Request::Shutdown => break,
        }
    }

    // Final synchronous-ish save on the way out.
    persist_with_retry(
        store,
        player_id,
        state,
        config.save_attempts,
        config.save_retry_base,
    )
    .await;
    debug!(player = %player_id.to_uuid_string(), "session closed");
}

/// Save a snapshot, retrying with doubling backoff.
async fn persist_with_retry(
    store: Arc<dyn Persistence>,
    player_id: PlayerId,
    state: PlayerState,
    attempts: u32,
    base: Duration,
) {
    let mut delay = base;
    for attempt in 1..=attempts {
        match store.save(player_id, &state) {
            Ok(()) => return,
            Err(error) if attempt < attempts => {
                debug!(player = %player_id.to_uuid_string(), %error, attempt, "save failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(error) => {
                warn!(player = %player_id.to_uuid_string(), %error, "snapshot dropped after retries");
            }
        }
    }
}
