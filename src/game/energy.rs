//! Energy Regulator
//!
//! Lazy time-based regeneration: `regen` is invoked at the start of
//! every energy-consuming command and derives the recovered amount from
//! `(last_update, now)`. No background timer exists.

use crate::core::clock::{Timestamp, MINUTE_MS};
use crate::game::error::EngineError;
use crate::game::state::Energy;

/// Recompute the pool from elapsed time and advance `last_update`.
///
/// Recovery is `recovery_rate` energy per minute, floored. Advancing
/// `last_update` on every call discards sub-minute remainders, matching
/// the reference behavior.
pub fn regen(energy: &mut Energy, now: Timestamp) {
    if energy.last_update == 0 {
        energy.last_update = now;
        return;
    }
    let elapsed = (now - energy.last_update).max(0);
    let recovered = (elapsed * energy.recovery_rate as i64 / MINUTE_MS) as u32;
    energy.current = energy.max.min(energy.current + recovered);
    energy.last_update = now;
}

/// Spend `cost` energy, rejecting if the pool cannot cover it.
pub fn consume(energy: &mut Energy, cost: u32) -> Result<(), EngineError> {
    if energy.current < cost {
        return Err(EngineError::InsufficientEnergy {
            needed: cost,
            available: energy.current,
        });
    }
    energy.current -= cost;
    Ok(())
}
