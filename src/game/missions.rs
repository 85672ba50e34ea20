//! Mission Board
//!
//! Fixed daily and weekly mission lists, reset wholesale when the
//! calendar key they were generated for goes stale. Progress is bumped
//! by engine triggers; payouts are claimed explicitly.

use crate::core::clock::{day_key, week_key, Timestamp};
use crate::game::command::MissionScope;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::state::{Mission, PlayerState};

/// Engine-side occurrences that advance mission counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// One accepted click.
    Click,
    /// One achievement unlocked.
    Badge,
    /// Click streak hit a multiple of five.
    StreakMilestone,
    /// One referral code redeemed.
    Referral,
}

struct MissionSpec {
    id: &'static str,
    goal: u32,
    reward: u64,
    trigger: Trigger,
}

const DAILY_MISSIONS: [MissionSpec; 2] = [
    MissionSpec { id: "click50", goal: 50, reward: 25, trigger: Trigger::Click },
    MissionSpec { id: "badge1", goal: 1, reward: 15, trigger: Trigger::Badge },
];

const WEEKLY_MISSIONS: [MissionSpec; 2] = [
    MissionSpec { id: "streak100", goal: 100, reward: 100, trigger: Trigger::StreakMilestone },
    MissionSpec { id: "refer1", goal: 1, reward: 50, trigger: Trigger::Referral },
];

fn instantiate(specs: &[MissionSpec]) -> Vec<Mission> {
    specs
        .iter()
        .map(|spec| Mission {
            id: spec.id.to_string(),
            goal: spec.goal,
            reward: spec.reward,
            ..Mission::default()
        })
        .collect()
}

/// Fresh daily mission list at zero progress.
pub fn fresh_daily_missions() -> Vec<Mission> {
    instantiate(&DAILY_MISSIONS)
}

/// Fresh weekly mission list at zero progress.
pub fn fresh_weekly_missions() -> Vec<Mission> {
    instantiate(&WEEKLY_MISSIONS)
}

/// Reset any list whose calendar key no longer matches the clock.
///
/// Unclaimed completed payouts are forfeited on reset.
pub fn reset_if_stale(state: &mut PlayerState, now: Timestamp) {
    let today = day_key(now);
    if state.missions.last_daily_key != today {
        state.missions.daily = fresh_daily_missions();
        state.missions.last_daily_key = today;
    }
    let this_week = week_key(now);
    if state.missions.last_weekly_key != this_week {
        state.missions.weekly = fresh_weekly_missions();
        state.missions.last_weekly_key = this_week;
    }
}

fn trigger_of(id: &str) -> Option<Trigger> {
    DAILY_MISSIONS
        .iter()
        .chain(WEEKLY_MISSIONS.iter())
        .find(|spec| spec.id == id)
        .map(|spec| spec.trigger)
}

/// Advance every mission wired to `trigger` by one.
pub fn bump(state: &mut PlayerState, trigger: Trigger, events: &mut Vec<DomainEvent>) {
    let missions = state
        .missions
        .daily
        .iter_mut()
        .chain(state.missions.weekly.iter_mut());
    for mission in missions {
        if trigger_of(&mission.id) != Some(trigger) || mission.completed {
            continue;
        }
        mission.progress = (mission.progress + 1).min(mission.goal);
        if mission.progress >= mission.goal {
            mission.completed = true;
            events.push(DomainEvent::MissionCompleted { id: mission.id.clone() });
        }
    }
}

/// Pay out a completed, unclaimed mission.
pub fn handle_claim(
    state: &mut PlayerState,
    scope: MissionScope,
    id: &str,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    let list = match scope {
        MissionScope::Daily => &mut state.missions.daily,
        MissionScope::Weekly => &mut state.missions.weekly,
    };
    let mission = list
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| EngineError::UnknownMission(id.to_string()))?;

    if !mission.completed {
        return Err(EngineError::MissionNotComplete);
    }
    if mission.claimed {
        return Err(EngineError::MissionAlreadyClaimed);
    }

    mission.claimed = true;
    let amount = mission.reward;
    let mission_id = mission.id.clone();
    state.currency += amount;
    events.push(DomainEvent::MissionRewardClaimed { id: mission_id, amount });
    Ok(())
}
