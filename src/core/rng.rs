//! RNG Port and Deterministic Generator
//!
//! Uses Xorshift128+ for fast, high-quality, deterministic randomness.
//! Given the same seed, produces identical sequences on all platforms.
//! Critical rolls and stat growth consume randomness only through the
//! [`EngineRng`] port, so tests can stub the sequence exactly.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// RNG port consumed by the engine.
///
/// Handlers never reach for ambient randomness; every roll goes through
/// this trait so replays and tests stay bit-identical.
pub trait EngineRng: Send {
    /// Next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Bernoulli roll with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform integer in `[0, n)`. Returns 0 when `n == 0`.
    fn roll(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let v = (self.next_f64() * n as f64) as u32;
        v.min(n - 1)
    }
}

/// Deterministic PRNG using Xorshift128+.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG produces the exact same sequence of
/// values on any platform. Persisting its state and restoring it resumes
/// the sequence exactly, which is what makes command-log replay viable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Get current state (for checkpointing).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

impl EngineRng for DeterministicRng {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        // 53 high bits of entropy, mapped to [0, 1).
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Scripted RNG for tests.
///
/// Yields the configured values in order, then the fallback forever.
/// A fallback of `0.99` never rolls a critical and always draws the
/// low stat increase.
#[derive(Clone, Debug)]
pub struct SequenceRng {
    values: Vec<f64>,
    pos: usize,
    fallback: f64,
}

impl SequenceRng {
    /// Scripted prefix followed by `fallback` forever.
    pub fn new(values: Vec<f64>, fallback: f64) -> Self {
        Self { values, pos: 0, fallback }
    }

    /// An RNG that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(Vec::new(), value)
    }
}

impl EngineRng for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        match self.values.get(self.pos) {
            Some(v) => {
                self.pos += 1;
                *v
            }
            None => self.fallback,
        }
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a stable per-player RNG seed from the player id.
///
/// Sessions seed their RNG this way so a replay of the same player's
/// command log reproduces the same critical rolls and stat draws.
pub fn derive_player_seed(player_id: &[u8; 16]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"PNTR_SEED_V1");
    hasher.update(player_id);
    let hash = hasher.finalize();
    u64::from_le_bytes(hash[0..8].try_into().unwrap())
}

// =============================================================================
// TESTS
// =============================================================================
