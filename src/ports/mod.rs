//! Engine Ports
//!
//! Trait seams between the deterministic core and the outside world.
//! The engine only ever sees these traits; production adapters (a real
//! database, an auth provider, a leaderboard service) and the in-memory
//! test doubles in [`memory`] are interchangeable behind them.

pub mod memory;

use std::collections::BTreeSet;

use thiserror::Error;

use crate::game::state::{PlayerId, PlayerState, PlayerSummary};

/// Snapshot storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The backing store could not be reached. Retryable.
    #[error("persistence backend unavailable")]
    Unavailable,
}

/// Snapshot storage for player aggregates.
///
/// Persistence failures never fail a command; the session retries saves
/// in the background.
pub trait Persistence: Send + Sync {
    fn save(&self, id: PlayerId, state: &PlayerState) -> Result<(), PersistenceError>;

    /// `Ok(None)` covers both a missing snapshot and an unreadable one;
    /// the caller starts a fresh player either way.
    fn load(&self, id: PlayerId) -> Result<Option<PlayerState>, PersistenceError>;
}

/// Resolves who the caller is.
pub trait Identity: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_player_id(&self) -> Option<PlayerId>;
}

/// Referral ledger write conflict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerConflict {
    /// Another writer touched the owner's inbound set concurrently.
    /// Retryable.
    #[error("concurrent referral ledger update")]
    Contention,
}

/// The cross-player referral ledger.
///
/// `append_inbound` has compare-and-swap semantics: an implementation
/// backed by shared storage reports `Contention` when it loses a race,
/// and the engine retries a bounded number of times. Appending a member
/// that is already present is a no-op, which is what makes the retry
/// loop safe.
pub trait ReferrerLookup: Send + Sync {
    /// Owner of the given referral code, if any.
    fn resolve(&self, code: &str) -> Option<PlayerId>;

    /// Record `member` as referred by `owner`.
    fn append_inbound(&self, owner: PlayerId, member: PlayerId) -> Result<(), LedgerConflict>;

    /// Everyone who redeemed `owner`'s code.
    fn inbound(&self, owner: PlayerId) -> BTreeSet<PlayerId>;

    /// Publish a player's code so others can redeem it.
    fn register_code(&self, code: &str, owner: PlayerId);
}

/// Fire-and-forget sink for ranking/telemetry summaries.
pub trait RankingSink: Send + Sync {
    fn submit(&self, id: PlayerId, summary: &PlayerSummary);
}
