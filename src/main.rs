//! pNTR Engine Demo
//!
//! Drives two player sessions through a scripted day of play against
//! in-memory ports, then verifies determinism by replaying the same
//! command log and comparing state hashes.

use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pntr_engine::core::clock::FixedClock;
use pntr_engine::core::rng::derive_player_seed;
use pntr_engine::game::command::{Command, MissionScope, RewardTrack, UpgradeKind};
use pntr_engine::ports::memory::{
    InMemoryReferralLedger, InMemoryStore, RecordingRanking, StaticIdentity,
};
use pntr_engine::ports::{Identity, ReferrerLookup};
use pntr_engine::session::{spawn_session, SessionConfig};
use pntr_engine::{Engine, PlayerId, PlayerState, Timestamp, VERSION};

// 2024-06-15T12:00:00Z
const START: Timestamp = 1_718_452_800_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("pNTR Engine v{}", VERSION);

    let ledger = Arc::new(InMemoryReferralLedger::new());
    let engine = Arc::new(Engine::new(ledger.clone()));
    let clock = Arc::new(FixedClock::new(START));
    let store = Arc::new(InMemoryStore::new());
    let ranking = Arc::new(RecordingRanking::new());

    // Two players; the second will redeem the first one's code. The
    // identity port stands in for whatever auth hands out at connect.
    let identity = StaticIdentity(PlayerId::new([1; 16]));
    let alice_id = identity
        .current_player_id()
        .ok_or_else(|| anyhow::anyhow!("no signed-in player"))?;
    let bob_id = PlayerId::new([2; 16]);

    let alice = spawn_session(
        alice_id,
        engine.clone(),
        clock.clone(),
        store.clone(),
        ranking.clone(),
        SessionConfig::default(),
    )
    .await;
    let bob = spawn_session(
        bob_id,
        engine.clone(),
        clock.clone(),
        store.clone(),
        ranking.clone(),
        SessionConfig::default(),
    )
    .await;

    let alice_code = alice.snapshot().await?.referral.own_code.clone();
    ledger.register_code(&alice_code, alice_id);
    info!("Alice referral code: {}", alice_code);

    // A burst of clicks, spaced to stay under the rate limit.
    let script: Vec<(i64, Command)> = (0..60)
        .map(|i| (i * 150, Command::Click))
        .chain([
            (10_000, Command::ClaimReward { track: RewardTrack::Daily }),
            (11_000, Command::Purchase { kind: UpgradeKind::ClickUpgrade }),
            (12_000, Command::Purchase { kind: UpgradeKind::AutoClicker }),
            // Let passive income accrue for a minute, then cash out a mission.
            (72_000, Command::ClaimMission { scope: MissionScope::Daily, id: "click50".into() }),
        ])
        .collect();

    let mut events_seen = 0;
    let mut alice_events = alice.subscribe();
    for (offset, command) in &script {
        clock.set(START + offset);
        if let Err(error) = alice.apply(command.clone()).await {
            info!("Alice command rejected: {}", error);
        }
        while let Ok(event) = alice_events.try_recv() {
            events_seen += 1;
            tracing::debug!("event: {}", event.name());
        }
    }

    clock.set(START + 80_000);
    bob.apply(Command::RedeemReferral { code: alice_code }).await?;

    // Alice's next command mirrors the ledger edge into her state.
    clock.set(START + 81_000);
    alice.apply(Command::Click).await?;

    let final_state = alice.snapshot().await?;
    info!("=== Session Results ===");
    info!("Events observed: {}", events_seen);
    info!("Currency: {} pNTR", final_state.currency);
    info!("Level: {} ({} clicks)", final_state.level, final_state.total_clicks);
    info!("Max streak: {}", final_state.max_streak);
    info!("Achievements: {:?}", final_state.achievements);
    info!("Referrals: {}", final_state.referral.inbound.len());
    info!("Airdrop points: {}", final_state.airdrop_points());
    info!("Final state hash: {}", hex::encode(final_state.state_hash()));

    info!("=== Verifying Determinism ===");
    verify_replay(&engine);

    alice.shutdown().await;
    bob.shutdown().await;
    Ok(())
}

/// Replay a fixed command log twice and compare hashes.
fn verify_replay(engine: &Engine) {
    let initial = PlayerState::new(PlayerId::new([7; 16]), START);
    let log: Vec<(Timestamp, Command)> = (0..50)
        .map(|i| (START + i * 200, Command::Click))
        .chain([(START + 15_000, Command::Purchase { kind: UpgradeKind::ClickUpgrade })])
        .collect();
    let seed = derive_player_seed(initial.id.as_bytes());

    let first = engine.replay(&initial, &log, seed);
    let second = engine.replay(&initial, &log, seed);

    info!("Replay hash A: {}", hex::encode(first.state_hash()));
    info!("Replay hash B: {}", hex::encode(second.state_hash()));
    if first.state_hash() == second.state_hash() {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        info!("DETERMINISM FAILURE: Hashes differ!");
    }
}
