//! Domain Events
//!
//! Every successful command yields zero or more of these; rejected
//! commands surface as `CommandRejected` on the event sink. Consumers
//! (presentation, telemetry) subscribe through the session's broadcast
//! channel; the engine has no dependency on how they are displayed.

use serde::{Deserialize, Serialize};

use crate::game::command::UpgradeKind;
use crate::game::state::Stats;

/// A typed event emitted by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// Currency earned from a click.
    CoinsEarned { amount: u64, critical: bool },
    /// Currency accrued lazily from the auto-clicker.
    PassiveIncome { amount: u64, ticks: u64 },
    /// Click streak continued or reset.
    StreakChanged { streak: u32 },
    /// Player reached a new level; stats after growth included.
    LevelUp { level: u32, stats: Stats },
    /// An upgrade purchase committed.
    UpgradePurchased { kind: UpgradeKind, level: u32, cost: u64 },
    /// A temporary multiplier bonus started.
    BonusActivated { value: f64, duration_ms: i64 },
    /// Auto-clicker paused or resumed.
    AutoClickerToggled { active: bool },
    /// Prestige reset committed.
    PrestigePerformed { level: u32, multiplier: f64 },
    /// A time-gated reward paid out.
    RewardClaimed { track: String, amount: u64 },
    /// A mission's counter reached its goal.
    MissionCompleted { id: String },
    /// A completed mission's payout was claimed.
    MissionRewardClaimed { id: String, amount: u64 },
    /// An achievement predicate became true.
    AchievementUnlocked { id: String },
    /// An unlocked title was equipped.
    TitleEquipped { id: String },
    /// A referral code redemption committed on both aggregates.
    ReferralAdded { code: String },
    /// Full reset to defaults.
    GameReset,
    /// A command was rejected; `reason` is `EngineError::reason()`.
    CommandRejected { reason: String },
}

impl DomainEvent {
    /// Stable event name for logs and telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::CoinsEarned { .. } => "coins_earned",
            DomainEvent::PassiveIncome { .. } => "passive_income",
            DomainEvent::StreakChanged { .. } => "streak_changed",
            DomainEvent::LevelUp { .. } => "level_up",
            DomainEvent::UpgradePurchased { .. } => "upgrade_purchased",
            DomainEvent::BonusActivated { .. } => "bonus_activated",
            DomainEvent::AutoClickerToggled { .. } => "auto_clicker_toggled",
            DomainEvent::PrestigePerformed { .. } => "prestige_performed",
            DomainEvent::RewardClaimed { .. } => "reward_claimed",
            DomainEvent::MissionCompleted { .. } => "mission_completed",
            DomainEvent::MissionRewardClaimed { .. } => "mission_reward_claimed",
            DomainEvent::AchievementUnlocked { .. } => "achievement_unlocked",
            DomainEvent::TitleEquipped { .. } => "title_equipped",
            DomainEvent::ReferralAdded { .. } => "referral_added",
            DomainEvent::GameReset => "game_reset",
            DomainEvent::CommandRejected { .. } => "command_rejected",
        }
    }
}
