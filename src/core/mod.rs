//! Deterministic Core Primitives
//!
//! Clock and RNG ports plus state hashing. Everything the game layer
//! needs to stay replayable: no system time, no ambient randomness,
//! no platform-dependent arithmetic.

pub mod clock;
pub mod hash;
pub mod rng;
