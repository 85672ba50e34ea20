//! Game Logic
//!
//! Pure, deterministic gameplay rules. Every module here is a set of
//! plain functions over [`state::PlayerState`]; the only entry point
//! used from outside is [`engine::Engine::apply`].

pub mod achievements;
pub mod anti_abuse;
pub mod command;
pub mod economy;
pub mod energy;
pub mod engine;
pub mod error;
pub mod events;
pub mod missions;
pub mod prestige;
pub mod progression;
pub mod referral;
pub mod rewards;
pub mod state;
pub mod upgrades;
