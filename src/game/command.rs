//! Engine Commands
//!
//! Every state transition enters through one of these. Commands carry no
//! timestamps; the session stamps `now` from the Clock port when it
//! dispatches, which is what makes command logs replayable.

use serde::{Deserialize, Serialize};

/// Purchasable upgrade kinds. Prestige is its own command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    ClickUpgrade,
    AutoClicker,
    Multiplier,
}

impl UpgradeKind {
    /// Stable name for events and logs.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::ClickUpgrade => "click_upgrade",
            UpgradeKind::AutoClicker => "auto_clicker",
            UpgradeKind::Multiplier => "multiplier",
        }
    }
}

/// The four time-gated reward tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardTrack {
    Daily,
    Weekly,
    Monthly,
    /// `day` is one of the cycle milestones {7, 14, 21, 28}.
    LoginMilestone { day: u32 },
}

impl RewardTrack {
    /// Stable name for events and logs.
    pub fn name(&self) -> &'static str {
        match self {
            RewardTrack::Daily => "daily",
            RewardTrack::Weekly => "weekly",
            RewardTrack::Monthly => "monthly",
            RewardTrack::LoginMilestone { .. } => "login",
        }
    }
}

/// Daily or weekly mission list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionScope {
    Daily,
    Weekly,
}

/// A command against a single player aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// The primary action: spend energy, earn currency and experience.
    Click,
    /// Buy one level of an upgrade track.
    Purchase { kind: UpgradeKind },
    /// Pause or resume a purchased auto-clicker.
    ToggleAutoClicker,
    /// Claim a time-gated reward.
    ClaimReward { track: RewardTrack },
    /// Claim a completed mission's payout.
    ClaimMission { scope: MissionScope, id: String },
    /// Trade current progress for a permanent multiplier.
    Prestige,
    /// Redeem another player's referral code.
    RedeemReferral { code: String },
    /// Equip an unlocked title.
    EquipTitle { id: String },
    /// Full reset to defaults, keeping only the player's own code.
    ResetGame,
}
