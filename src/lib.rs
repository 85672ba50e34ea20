//! # pNTR Engine
//!
//! Authoritative state engine for the pNTR incremental tap game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       PNTR ENGINE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── clock.rs     - Timestamps, calendar keys, Clock port    │
//! │  ├── rng.rs       - Deterministic Xorshift128+ PRNG          │
//! │  └── hash.rs      - State hashing for replay verification    │
//! │                                                              │
//! │  game/            - Game rules (deterministic)               │
//! │  ├── state.rs     - The per-player aggregate                 │
//! │  ├── engine.rs    - Command dispatch and housekeeping        │
//! │  ├── economy.rs   - Clicks, streaks, criticals               │
//! │  ├── progression.rs - Experience curve and leveling          │
//! │  ├── upgrades.rs  - The upgrade shop and auto-clicker        │
//! │  ├── prestige.rs  - Prestige reset loop                      │
//! │  ├── energy.rs    - Lazy energy regeneration                 │
//! │  ├── anti_abuse.rs- Click rate limiting                      │
//! │  ├── rewards.rs   - Daily/weekly/monthly/login tracks        │
//! │  ├── missions.rs  - Daily and weekly missions                │
//! │  ├── achievements.rs - Achievements, events, titles          │
//! │  └── referral.rs  - Referral codes and the ledger edge       │
//! │                                                              │
//! │  ports/           - Trait seams to the outside world         │
//! │  session/         - Per-player actor (non-deterministic)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No system time reads; `now` is stamped by the caller
//! - No background timers; all time effects recomputed lazily
//! - No HashMap (uses BTreeMap/BTreeSet for sorted iteration)
//! - All randomness from seeded Xorshift128+
//!
//! Given the same starting state, command log, timestamps, and seed,
//! [`game::engine::Engine::replay`] reproduces the **identical state
//! hash** on any platform.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod ports;
pub mod session;

// Re-export commonly used types
pub use crate::core::clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use crate::core::rng::DeterministicRng;
pub use game::command::Command;
pub use game::engine::Engine;
pub use game::error::EngineError;
pub use game::events::DomainEvent;
pub use game::state::{PlayerId, PlayerState, PlayerSummary};
pub use session::{SessionConfig, SessionHandle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
