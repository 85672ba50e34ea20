//! Prestige Loop
//!
//! Voluntary reset of the run-scoped economy in exchange for permanent
//! multipliers. Account-scoped records (referrals, achievements,
//! lifetime counters, reward tracks) survive the reset.

use crate::core::clock::Timestamp;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::progression::experience_to_next;
use crate::game::state::{
    AntiAbuse, Energy, PlayerState, Stats, Upgrades, BASE_CLICK_VALUE,
};

/// Currency required before a prestige is allowed.
pub const PRESTIGE_THRESHOLD: u64 = 10_000;

/// One prestige point is minted per this much currency held at reset.
pub const POINTS_PER_CURRENCY: u64 = 1_000;

/// Multiplier growth per prestige level.
pub const MULTIPLIER_GROWTH: f64 = 1.1;

/// Process a prestige command.
pub fn handle_prestige(
    state: &mut PlayerState,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    if state.currency < PRESTIGE_THRESHOLD {
        return Err(EngineError::InsufficientPrestigeFunds {
            needed: PRESTIGE_THRESHOLD,
            available: state.currency,
        });
    }

    let points = state.currency / POINTS_PER_CURRENCY;
    let new_level = state.prestige.level + 1;
    let new_multiplier = state.prestige.multipliers.currency * MULTIPLIER_GROWTH;

    state.prestige.level = new_level;
    state.prestige.points += points;
    state.prestige.total_points += points;
    state.prestige.multipliers.currency = new_multiplier;
    state.prestige.multipliers.experience = new_multiplier;
    state.prestige.multipliers.upgrade_discount = new_multiplier;

    // Run-scoped economy back to defaults, boosted by the new multiplier.
    state.currency = 0;
    state.level = 1;
    state.experience = 0;
    state.experience_to_next = experience_to_next(1);
    state.stats = Stats::default();
    state.streak = 0;
    state.upgrades = Upgrades::default();
    state.click_value = (BASE_CLICK_VALUE as f64 * new_multiplier).floor() as u64;

    // Energy and rate counters restart with the run. The suspicious
    // flag survives; only a full reset clears it.
    let suspicious = state.anti_abuse.suspicious;
    state.energy = Energy { last_update: now, ..Energy::default() };
    state.anti_abuse = AntiAbuse { suspicious, ..AntiAbuse::default() };

    events.push(DomainEvent::PrestigePerformed {
        level: new_level,
        multiplier: new_multiplier,
    });
    Ok(())
}
