//! Reward Tracks
//!
//! Four time-gated tracks: daily (calendar-day gate with a claim
//! streak), weekly and monthly (elapsed-time gates with payouts indexed
//! by account age), and login milestones (repeating 28-day cycle).
//! Availability is recomputed lazily at the start of every command.

use crate::core::clock::{day_key, Timestamp, MONTH_MS, WEEK_MS};
use crate::game::command::RewardTrack;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::state::PlayerState;

/// Days inside the login cycle that carry a milestone payout.
pub const LOGIN_MILESTONES: [(u32, u64); 4] = [(7, 1_000), (14, 2_500), (21, 5_000), (28, 10_000)];

/// Length of one login milestone cycle in days.
pub const LOGIN_CYCLE_DAYS: u32 = 28;

/// Recompute `available` on all time-gated tracks from the clock.
pub fn refresh(state: &mut PlayerState, now: Timestamp) {
    let today = day_key(now);
    state.rewards.daily.available =
        state.rewards.daily.last_claim_day.as_deref() != Some(today.as_str());
    state.rewards.weekly.available = state
        .rewards
        .weekly
        .last_claim_ts
        .map_or(true, |ts| now - ts >= WEEK_MS);
    state.rewards.monthly.available = state
        .rewards
        .monthly
        .last_claim_ts
        .map_or(true, |ts| now - ts >= MONTH_MS);
}

/// Process a claim command for the given track.
pub fn handle_claim(
    state: &mut PlayerState,
    track: RewardTrack,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    let amount = match track {
        RewardTrack::Daily => claim_daily(state, now)?,
        RewardTrack::Weekly => claim_weekly(state, now)?,
        RewardTrack::Monthly => claim_monthly(state, now)?,
        RewardTrack::LoginMilestone { day } => claim_login(state, day)?,
    };
    state.currency += amount;
    events.push(DomainEvent::RewardClaimed { track: track.name().to_string(), amount });
    Ok(())
}

fn claim_daily(state: &mut PlayerState, now: Timestamp) -> Result<u64, EngineError> {
    let today = day_key(now);
    let daily = &mut state.rewards.daily;
    if !daily.available || daily.last_claim_day.as_deref() == Some(today.as_str()) {
        return Err(EngineError::RewardNotAvailable);
    }

    daily.streak += 1;
    let amount = (100.0 * 1.5f64.powi(daily.streak as i32 - 1)).floor() as u64;
    daily.last_claim_day = Some(today);
    daily.last_claim_ts = Some(now);
    daily.available = false;
    Ok(amount)
}

fn claim_weekly(state: &mut PlayerState, now: Timestamp) -> Result<u64, EngineError> {
    if !state.rewards.weekly.available {
        return Err(EngineError::RewardNotAvailable);
    }
    // Payout grows with account age, not with claims made.
    let weeks = ((now - state.created_at).max(0) / WEEK_MS) as i32;
    let amount = (500.0 * 1.2f64.powi(weeks)).floor() as u64;

    let weekly = &mut state.rewards.weekly;
    weekly.last_claim_day = Some(day_key(now));
    weekly.last_claim_ts = Some(now);
    weekly.available = false;
    Ok(amount)
}

fn claim_monthly(state: &mut PlayerState, now: Timestamp) -> Result<u64, EngineError> {
    if !state.rewards.monthly.available {
        return Err(EngineError::RewardNotAvailable);
    }
    let months = ((now - state.created_at).max(0) / MONTH_MS) as i32;
    let amount = (2_000.0 * 1.1f64.powi(months)).floor() as u64;

    let monthly = &mut state.rewards.monthly;
    monthly.last_claim_day = Some(day_key(now));
    monthly.last_claim_ts = Some(now);
    monthly.available = false;
    Ok(amount)
}

fn claim_login(state: &mut PlayerState, day: u32) -> Result<u64, EngineError> {
    let amount = LOGIN_MILESTONES
        .iter()
        .find(|(d, _)| *d == day)
        .map(|(_, amount)| *amount)
        .ok_or(EngineError::InvalidMilestone(day))?;

    // Milestones repeat every cycle. Claims are keyed by the absolute
    // milestone day (cycle * 28 + day) so each occurrence pays once.
    let mut key = day;
    while state.rewards.login.claimed.contains(&key) {
        key += LOGIN_CYCLE_DAYS;
    }
    if (state.days_active.len() as u32) < key {
        return Err(EngineError::RewardNotAvailable);
    }
    state.rewards.login.claimed.insert(key);
    Ok(amount)
}
