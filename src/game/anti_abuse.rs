//! Anti-Abuse Gate
//!
//! Sliding one-second window over click arrivals. Every click command
//! passes through here before the economy handler runs; a rejection
//! leaves the economy untouched but does record the attempt in the
//! window counters.

use crate::core::clock::Timestamp;
use crate::game::error::EngineError;
use crate::game::state::AntiAbuse;

/// Maximum accepted clicks inside one window.
pub const MAX_CLICKS_PER_SECOND: u32 = 10;

/// Window length in milliseconds.
pub const RATE_WINDOW_MS: i64 = 1_000;

/// Register a click against the rate window.
///
/// The window is anchored at the first click: `window_count` includes the
/// anchoring click, so the eleventh click inside one second is the first
/// to be rejected. The `suspicious` flag is sticky once set; it has no
/// decay path and only a full reset clears it.
pub fn register_click(gate: &mut AntiAbuse, now: Timestamp) -> Result<(), EngineError> {
    if now - gate.last_click_time >= RATE_WINDOW_MS {
        gate.last_click_time = now;
        gate.window_count = 1;
        return Ok(());
    }

    gate.window_count += 1;
    if gate.window_count > MAX_CLICKS_PER_SECOND {
        gate.suspicious = true;
        return Err(EngineError::RateLimited);
    }
    Ok(())
}
