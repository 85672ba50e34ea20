//! In-Memory Port Adapters
//!
//! Mutex-guarded BTreeMap implementations of every port. They back the
//! demo binary and the test suite; failure injection knobs let tests
//! exercise the retry paths without a flaky backend.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::game::state::{PlayerId, PlayerState, PlayerSummary};
use crate::ports::{
    Identity, LedgerConflict, Persistence, PersistenceError, RankingSink, ReferrerLookup,
};

/// Snapshot store holding bincode blobs.
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: Mutex<BTreeMap<PlayerId, Vec<u8>>>,
    fail_next: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` saves report `Unavailable`.
    pub fn fail_next_saves(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persistence for InMemoryStore {
    fn save(&self, id: PlayerId, state: &PlayerState) -> Result<(), PersistenceError> {
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(PersistenceError::Unavailable);
        }
        let bytes = bincode::serialize(state).map_err(|_| PersistenceError::Unavailable)?;
        self.snapshots.lock().unwrap().insert(id, bytes);
        Ok(())
    }

    fn load(&self, id: PlayerId) -> Result<Option<PlayerState>, PersistenceError> {
        let snapshots = self.snapshots.lock().unwrap();
        let Some(bytes) = snapshots.get(&id) else {
            return Ok(None);
        };
        // An unreadable snapshot is treated as absent rather than fatal.
        Ok(bincode::deserialize(bytes).ok())
    }
}

/// Referral ledger with injectable write contention.
#[derive(Default)]
pub struct InMemoryReferralLedger {
    codes: Mutex<BTreeMap<String, PlayerId>>,
    inbound: Mutex<BTreeMap<PlayerId, BTreeSet<PlayerId>>>,
    contention: AtomicU32,
}

impl InMemoryReferralLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` appends report `Contention`.
    pub fn contend_next_appends(&self, count: u32) {
        self.contention.store(count, Ordering::SeqCst);
    }
}

impl ReferrerLookup for InMemoryReferralLedger {
    fn resolve(&self, code: &str) -> Option<PlayerId> {
        self.codes.lock().unwrap().get(code).copied()
    }

    fn append_inbound(&self, owner: PlayerId, member: PlayerId) -> Result<(), LedgerConflict> {
        if self.contention.load(Ordering::SeqCst) > 0 {
            self.contention.fetch_sub(1, Ordering::SeqCst);
            return Err(LedgerConflict::Contention);
        }
        self.inbound.lock().unwrap().entry(owner).or_default().insert(member);
        Ok(())
    }

    fn inbound(&self, owner: PlayerId) -> BTreeSet<PlayerId> {
        self.inbound.lock().unwrap().get(&owner).cloned().unwrap_or_default()
    }

    fn register_code(&self, code: &str, owner: PlayerId) {
        self.codes.lock().unwrap().insert(code.to_string(), owner);
    }
}

/// Fixed identity, as issued at connection time.
pub struct StaticIdentity(pub PlayerId);

impl Identity for StaticIdentity {
    fn current_player_id(&self) -> Option<PlayerId> {
        Some(self.0)
    }
}

/// No player signed in.
pub struct AnonymousIdentity;

impl Identity for AnonymousIdentity {
    fn current_player_id(&self) -> Option<PlayerId> {
        None
    }
}

/// Records every submitted summary for inspection.
#[derive(Default)]
pub struct RecordingRanking {
    submissions: Mutex<Vec<(PlayerId, PlayerSummary)>>,
}

impl RecordingRanking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<(PlayerId, PlayerSummary)> {
        self.submissions.lock().unwrap().clone()
    }
}

impl RankingSink for RecordingRanking {
    fn submit(&self, id: PlayerId, summary: &PlayerSummary) {
        self.submissions.lock().unwrap().push((id, *summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_roundtrip() {
        let store = InMemoryStore::new();
        let id = PlayerId::new([1; 16]);
        let mut state = PlayerState::new(id, 1_000);
        state.currency = 77;

        store.save(id, &state).unwrap();
        let loaded = store.load(id).unwrap().unwrap();
        assert_eq!(loaded.currency, 77);
        assert_eq!(loaded.state_hash(), state.state_hash());
    }

    #[test]
    fn test_store_missing_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.load(PlayerId::new([9; 16])).unwrap(), None);
    }

    #[test]
    fn test_store_failure_injection() {
        let store = InMemoryStore::new();
        let id = PlayerId::new([1; 16]);
        let state = PlayerState::new(id, 1_000);

        store.fail_next_saves(2);
        assert_eq!(store.save(id, &state), Err(PersistenceError::Unavailable));
        assert_eq!(store.save(id, &state), Err(PersistenceError::Unavailable));
        assert!(store.save(id, &state).is_ok());
    }

    #[test]
    fn test_identity_signed_in_or_not() {
        let id = PlayerId::new([3; 16]);
        assert_eq!(StaticIdentity(id).current_player_id(), Some(id));
        assert_eq!(AnonymousIdentity.current_player_id(), None);
    }

    #[test]
    fn test_ledger_resolve_and_inbound() {
        let ledger = InMemoryReferralLedger::new();
        let owner = PlayerId::new([1; 16]);
        let member = PlayerId::new([2; 16]);

        ledger.register_code("AAAABBBB", owner);
        assert_eq!(ledger.resolve("AAAABBBB"), Some(owner));
        assert_eq!(ledger.resolve("ZZZZZZZZ"), None);

        ledger.append_inbound(owner, member).unwrap();
        // Duplicate append is a no-op.
        ledger.append_inbound(owner, member).unwrap();
        assert_eq!(ledger.inbound(owner).len(), 1);
    }

    #[test]
    fn test_ledger_contention_injection() {
        let ledger = InMemoryReferralLedger::new();
        let owner = PlayerId::new([1; 16]);
        let member = PlayerId::new([2; 16]);

        ledger.contend_next_appends(1);
        assert_eq!(
            ledger.append_inbound(owner, member),
            Err(LedgerConflict::Contention)
        );
        assert!(ledger.append_inbound(owner, member).is_ok());
    }
}
