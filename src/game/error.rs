//! Engine Error Taxonomy
//!
//! Validation errors and rule violations are rejected synchronously as
//! typed results; transitions are all-or-nothing, so a returned error
//! means the command applied no economy mutation. External failures
//! (persistence, ledger) live with their ports, not here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed rejection of a command.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EngineError {
    // --- Validation errors (malformed input) ---
    #[error("referral code must be exactly 8 characters, got {0}")]
    InvalidCodeLength(usize),
    #[error("login milestone must be one of 7/14/21/28, got {0}")]
    InvalidMilestone(u32),
    #[error("unknown mission id: {0}")]
    UnknownMission(String),
    #[error("unknown title id: {0}")]
    UnknownTitle(String),

    // --- Rule violations ---
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("prestige requires {needed} pNTR, have {available}")]
    InsufficientPrestigeFunds { needed: u64, available: u64 },
    #[error("insufficient energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: u32, available: u32 },
    #[error("click rate limit exceeded")]
    RateLimited,
    #[error("reward is not available yet")]
    RewardNotAvailable,
    #[error("mission is not completed yet")]
    MissionNotComplete,
    #[error("mission reward was already claimed")]
    MissionAlreadyClaimed,
    #[error("auto-clicker has not been purchased")]
    AutoClickerNotOwned,
    #[error("title is not unlocked: {0}")]
    TitleLocked(String),
    #[error("cannot redeem your own referral code")]
    SelfReferral,
    #[error("a referral code was already redeemed")]
    AlreadyReferred,
    #[error("referral code does not match any player")]
    UnknownCode,
    #[error("referral ledger conflict persisted after retries")]
    ReferralConflict,
}

impl EngineError {
    /// Stable machine-readable tag for the event sink and telemetry.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::InvalidCodeLength(_) => "invalid_code_length",
            EngineError::InvalidMilestone(_) => "invalid_milestone",
            EngineError::UnknownMission(_) => "unknown_mission",
            EngineError::UnknownTitle(_) => "unknown_title",
            EngineError::InsufficientFunds { .. } => "insufficient_funds",
            EngineError::InsufficientPrestigeFunds { .. } => "insufficient_prestige_funds",
            EngineError::InsufficientEnergy { .. } => "insufficient_energy",
            EngineError::RateLimited => "rate_limited",
            EngineError::RewardNotAvailable => "reward_not_available",
            EngineError::MissionNotComplete => "mission_not_complete",
            EngineError::MissionAlreadyClaimed => "mission_already_claimed",
            EngineError::AutoClickerNotOwned => "auto_clicker_not_owned",
            EngineError::TitleLocked(_) => "title_locked",
            EngineError::SelfReferral => "self_referral",
            EngineError::AlreadyReferred => "already_referred",
            EngineError::UnknownCode => "unknown_code",
            EngineError::ReferralConflict => "referral_conflict",
        }
    }
}
