//! Player State Definitions
//!
//! The single per-player aggregate and all of its sub-structures.
//! Uses BTreeMap/BTreeSet for deterministic iteration order, and
//! `#[serde(default)]` everywhere so partially persisted snapshots load
//! with documented defaults instead of failing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::clock::{day_key, week_key, Timestamp};
use crate::core::hash::{StateHash, StateHasher};
use crate::game::missions::{fresh_daily_missions, fresh_weekly_missions};
use crate::game::progression::experience_to_next;
use crate::game::referral::generate_referral_code;

/// Level cap.
pub const MAX_LEVEL: u32 = 10;

/// Click value of a fresh player, before prestige multipliers.
pub const BASE_CLICK_VALUE: u64 = 1;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeSet/BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// SUB-STRUCTURES
// =============================================================================

/// Cosmetic combat stats, grown on level-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub strength: u32,
    pub agility: u32,
    pub defense: u32,
    pub charisma: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self { strength: 1, agility: 1, defense: 1, charisma: 1 }
    }
}

/// The click-value upgrade track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickUpgrade {
    pub level: u32,
    pub cost: u64,
    pub value: u64,
}

impl Default for ClickUpgrade {
    fn default() -> Self {
        Self { level: 1, cost: 10, value: 1 }
    }
}

/// The auto-clicker upgrade track.
///
/// Passive income is accrued lazily from `last_tick` on the next command;
/// there is no background timer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoClicker {
    pub level: u32,
    pub cost: u64,
    pub value: f64,
    pub interval_ms: i64,
    pub active: bool,
    pub last_tick: Timestamp,
}

impl Default for AutoClicker {
    fn default() -> Self {
        Self {
            level: 0,
            cost: 100,
            value: 0.1,
            interval_ms: 1_000,
            active: false,
            last_tick: 0,
        }
    }
}

/// The temporary-multiplier upgrade track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierUpgrade {
    pub level: u32,
    pub cost: u64,
    pub value: f64,
    pub duration_ms: i64,
}

impl Default for MultiplierUpgrade {
    fn default() -> Self {
        Self { level: 0, cost: 500, value: 1.5, duration_ms: 30_000 }
    }
}

/// All purchasable upgrade tracks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Upgrades {
    pub click: ClickUpgrade,
    pub auto: AutoClicker,
    pub multiplier: MultiplierUpgrade,
}

/// Permanent multipliers earned through prestige.
///
/// The reference design compounds all three tracks as one value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestigeMultipliers {
    pub currency: f64,
    pub experience: f64,
    pub upgrade_discount: f64,
}

impl Default for PrestigeMultipliers {
    fn default() -> Self {
        Self { currency: 1.0, experience: 1.0, upgrade_discount: 1.0 }
    }
}

/// Prestige progression. Survives every reset except a full one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prestige {
    pub level: u32,
    pub points: u64,
    pub total_points: u64,
    pub multipliers: PrestigeMultipliers,
}

/// Regenerating energy pool. Invariant: `0 <= current <= max`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Energy {
    pub current: u32,
    pub max: u32,
    pub last_update: Timestamp,
    /// Energy recovered per minute.
    pub recovery_rate: u32,
    /// Energy spent per click.
    pub click_cost: u32,
}

impl Default for Energy {
    fn default() -> Self {
        Self { current: 100, max: 100, last_update: 0, recovery_rate: 1, click_cost: 1 }
    }
}

/// Sliding-window click-rate limiter state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiAbuse {
    /// Anchor of the current one-second window.
    pub last_click_time: Timestamp,
    /// Clicks observed in the current window, including the anchor click.
    pub window_count: u32,
    /// Sticky once set; only a full reset clears it.
    pub suspicious: bool,
}

/// Kind of a time-boxed bonus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusKind {
    Multiplier,
}

/// A time-boxed multiplicative effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveBonus {
    pub kind: BonusKind,
    pub value: f64,
    pub start_time: Timestamp,
    pub duration_ms: i64,
}

impl ActiveBonus {
    /// Entries are removed once `now - start_time >= duration_ms`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        now - self.start_time < self.duration_ms
    }
}

/// Daily reward track, keyed by calendar date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyReward {
    pub streak: u32,
    pub last_claim_day: Option<String>,
    pub last_claim_ts: Option<Timestamp>,
    pub available: bool,
}

impl Default for DailyReward {
    fn default() -> Self {
        Self { streak: 0, last_claim_day: None, last_claim_ts: None, available: true }
    }
}

/// Weekly/monthly reward track, keyed by elapsed time since last claim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicReward {
    pub last_claim_day: Option<String>,
    pub last_claim_ts: Option<Timestamp>,
    pub available: bool,
}

impl Default for PeriodicReward {
    fn default() -> Self {
        Self { last_claim_day: None, last_claim_ts: None, available: true }
    }
}

/// Login milestone track. Keys are absolute milestone days
/// (`cycle * 28 + day`), so the same milestone can never be re-claimed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginReward {
    pub claimed: BTreeSet<u32>,
}

/// All four time-gated reward tracks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub daily: DailyReward,
    pub weekly: PeriodicReward,
    pub monthly: PeriodicReward,
    pub login: LoginReward,
}

/// A counter-tracked, calendar-reset objective.
///
/// `completed` (progress reached goal) and `claimed` (reward paid) are
/// distinct states; claiming requires `completed && !claimed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mission {
    pub id: String,
    pub goal: u32,
    pub progress: u32,
    pub reward: u64,
    pub completed: bool,
    pub claimed: bool,
}

impl Default for Mission {
    fn default() -> Self {
        Self {
            id: String::new(),
            goal: 1,
            progress: 0,
            reward: 0,
            completed: false,
            claimed: false,
        }
    }
}

/// Daily and weekly mission lists plus the calendar keys they were
/// generated for. A key mismatch triggers a wholesale reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Missions {
    pub daily: Vec<Mission>,
    pub weekly: Vec<Mission>,
    pub last_daily_key: String,
    pub last_weekly_key: String,
}

/// Referral bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Referral {
    /// Immutable 8-character code owned by this player.
    pub own_code: String,
    /// The code this player redeemed, set at most once.
    pub redeemed_code: Option<String>,
    /// Players who redeemed this player's code. Mirrors the referral
    /// ledger; refreshed lazily on each command.
    pub inbound: BTreeSet<PlayerId>,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// Complete state of one player.
///
/// Owned and mutated exclusively by the engine's command handlers;
/// persisted as an opaque snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub id: PlayerId,
    pub created_at: Timestamp,

    /// pNTR balance. Never negative.
    pub currency: u64,
    pub click_value: u64,

    pub level: u32,
    pub experience: u64,
    pub experience_to_next: u64,
    pub stats: Stats,

    pub streak: u32,
    pub max_streak: u32,
    pub last_click: Timestamp,
    pub total_clicks: u64,
    /// Calendar day keys on which the player clicked at least once.
    pub days_active: BTreeSet<String>,

    pub upgrades: Upgrades,
    pub prestige: Prestige,
    pub energy: Energy,
    pub anti_abuse: AntiAbuse,
    pub active_bonuses: Vec<ActiveBonus>,
    pub rewards: Rewards,

    /// Monotonic set of unlocked achievement ids; entries are never removed.
    pub achievements: BTreeSet<String>,
    pub missions: Missions,
    pub referral: Referral,
    pub equipped_title: String,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            id: PlayerId::default(),
            created_at: 0,
            currency: 0,
            click_value: BASE_CLICK_VALUE,
            level: 1,
            experience: 0,
            experience_to_next: experience_to_next(1),
            stats: Stats::default(),
            streak: 0,
            max_streak: 0,
            last_click: 0,
            total_clicks: 0,
            days_active: BTreeSet::new(),
            upgrades: Upgrades::default(),
            prestige: Prestige::default(),
            energy: Energy::default(),
            anti_abuse: AntiAbuse::default(),
            active_bonuses: Vec::new(),
            rewards: Rewards::default(),
            achievements: BTreeSet::new(),
            missions: Missions::default(),
            referral: Referral::default(),
            equipped_title: "starter".to_string(),
        }
    }
}

impl PlayerState {
    /// Create a fresh player with a newly generated referral code.
    pub fn new(id: PlayerId, now: Timestamp) -> Self {
        let mut state = Self {
            id,
            created_at: now,
            ..Self::default()
        };
        state.energy.last_update = now;
        state.referral.own_code = generate_referral_code();
        state.missions = Missions {
            daily: fresh_daily_missions(),
            weekly: fresh_weekly_missions(),
            last_daily_key: day_key(now),
            last_weekly_key: week_key(now),
        };
        state
    }

    /// Level-derived portrait tier, recomputed deterministically.
    pub fn portrait_tier(&self) -> u32 {
        self.level.min(MAX_LEVEL)
    }

    /// Product of all unexpired multiplier bonuses.
    pub fn bonus_multiplier(&self, now: Timestamp) -> f64 {
        self.active_bonuses
            .iter()
            .filter(|b| b.kind == BonusKind::Multiplier && b.is_active(now))
            .fold(1.0, |acc, b| acc * b.value)
    }

    /// Derived airdrop score. Never stored; recomputed on demand.
    pub fn airdrop_points(&self) -> u64 {
        let click_points = self.total_clicks / 2;
        let level_points = self.level as u64 * 10;
        let achievement_points = self.achievements.len() as u64 * 7;
        let upgrade_points = self.upgrades.click.level.saturating_sub(1) as u64 * 3;
        let streak_bonus = (self.max_streak / 10) as u64 * 5;
        let daily_bonus = self.days_active.len() as u64 * 10;
        click_points + level_points + achievement_points + upgrade_points + streak_bonus + daily_bonus
    }

    /// Read-only summary for the ranking/telemetry port.
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            currency: self.currency,
            level: self.level,
            total_clicks: self.total_clicks,
            max_streak: self.max_streak,
            prestige_level: self.prestige.level,
            airdrop_points: self.airdrop_points(),
        }
    }

    /// Hash every gameplay field for replay verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_uuid(&self.id.0);
        hasher.update_i64(self.created_at);
        hasher.update_u64(self.currency);
        hasher.update_u64(self.click_value);
        hasher.update_u32(self.level);
        hasher.update_u64(self.experience);
        hasher.update_u64(self.experience_to_next);
        hasher.update_u32(self.stats.strength);
        hasher.update_u32(self.stats.agility);
        hasher.update_u32(self.stats.defense);
        hasher.update_u32(self.stats.charisma);
        hasher.update_u32(self.streak);
        hasher.update_u32(self.max_streak);
        hasher.update_i64(self.last_click);
        hasher.update_u64(self.total_clicks);
        for day in &self.days_active {
            hasher.update_str(day);
        }

        hasher.update_u32(self.upgrades.click.level);
        hasher.update_u64(self.upgrades.click.cost);
        hasher.update_u64(self.upgrades.click.value);
        hasher.update_u32(self.upgrades.auto.level);
        hasher.update_u64(self.upgrades.auto.cost);
        hasher.update_f64(self.upgrades.auto.value);
        hasher.update_i64(self.upgrades.auto.interval_ms);
        hasher.update_bool(self.upgrades.auto.active);
        hasher.update_i64(self.upgrades.auto.last_tick);
        hasher.update_u32(self.upgrades.multiplier.level);
        hasher.update_u64(self.upgrades.multiplier.cost);
        hasher.update_f64(self.upgrades.multiplier.value);
        hasher.update_i64(self.upgrades.multiplier.duration_ms);

        hasher.update_u32(self.prestige.level);
        hasher.update_u64(self.prestige.points);
        hasher.update_u64(self.prestige.total_points);
        hasher.update_f64(self.prestige.multipliers.currency);
        hasher.update_f64(self.prestige.multipliers.experience);
        hasher.update_f64(self.prestige.multipliers.upgrade_discount);

        hasher.update_u32(self.energy.current);
        hasher.update_u32(self.energy.max);
        hasher.update_i64(self.energy.last_update);
        hasher.update_u32(self.energy.recovery_rate);
        hasher.update_u32(self.energy.click_cost);

        hasher.update_i64(self.anti_abuse.last_click_time);
        hasher.update_u32(self.anti_abuse.window_count);
        hasher.update_bool(self.anti_abuse.suspicious);

        for bonus in &self.active_bonuses {
            hasher.update_u8(bonus.kind as u8);
            hasher.update_f64(bonus.value);
            hasher.update_i64(bonus.start_time);
            hasher.update_i64(bonus.duration_ms);
        }

        hasher.update_u32(self.rewards.daily.streak);
        hasher.update_str(self.rewards.daily.last_claim_day.as_deref().unwrap_or(""));
        hasher.update_i64(self.rewards.daily.last_claim_ts.unwrap_or(0));
        hasher.update_bool(self.rewards.daily.available);
        hasher.update_i64(self.rewards.weekly.last_claim_ts.unwrap_or(0));
        hasher.update_bool(self.rewards.weekly.available);
        hasher.update_i64(self.rewards.monthly.last_claim_ts.unwrap_or(0));
        hasher.update_bool(self.rewards.monthly.available);
        for milestone in &self.rewards.login.claimed {
            hasher.update_u32(*milestone);
        }

        for id in &self.achievements {
            hasher.update_str(id);
        }

        for mission in self.missions.daily.iter().chain(self.missions.weekly.iter()) {
            hasher.update_str(&mission.id);
            hasher.update_u32(mission.progress);
            hasher.update_bool(mission.completed);
            hasher.update_bool(mission.claimed);
        }
        hasher.update_str(&self.missions.last_daily_key);
        hasher.update_str(&self.missions.last_weekly_key);

        hasher.update_str(&self.referral.own_code);
        hasher.update_str(self.referral.redeemed_code.as_deref().unwrap_or(""));
        for member in &self.referral.inbound {
            hasher.update_uuid(&member.0);
        }

        hasher.update_str(&self.equipped_title);
    }

    /// Compute the full state hash.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_player_state();
        self.hash_into(&mut hasher);
        hasher.finalize()
    }
}

/// Read-only summary consumed by the ranking/telemetry port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub currency: u64,
    pub level: u32,
    pub total_clicks: u64,
    pub max_streak: u32,
    pub prestige_level: u32,
    pub airdrop_points: u64,
}

// =============================================================================
// TESTS
// =============================================================================
