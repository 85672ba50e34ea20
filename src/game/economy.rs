//! Economy Engine
//!
//! Click processing: streak arithmetic, multiplier stacking, critical
//! rolls, and the currency/experience payout. The anti-abuse gate and
//! the energy pool are consulted before any economy mutation happens.

use crate::core::clock::{day_key, Timestamp};
use crate::core::rng::EngineRng;
use crate::game::anti_abuse;
use crate::game::energy;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::missions::{self, Trigger};
use crate::game::progression;
use crate::game::state::PlayerState;

/// Clicks closer together than this extend the streak.
pub const STREAK_WINDOW_MS: i64 = 900;

/// Probability of a critical click.
pub const CRIT_CHANCE: f64 = 0.10;

/// Payout factor of a critical click.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Process one click command.
///
/// Order matters: the rate gate runs first (a rejection records the
/// attempt but touches nothing else), then energy, then the payout.
pub fn handle_click(
    state: &mut PlayerState,
    now: Timestamp,
    rng: &mut dyn EngineRng,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    anti_abuse::register_click(&mut state.anti_abuse, now)?;

    energy::regen(&mut state.energy, now);
    let cost = state.energy.click_cost;
    energy::consume(&mut state.energy, cost)?;

    // Streak: extend inside the window, otherwise restart at 1.
    let streak = if now - state.last_click < STREAK_WINDOW_MS {
        state.streak + 1
    } else {
        1
    };
    let streak_changed = streak != state.streak;
    state.streak = streak;
    state.max_streak = state.max_streak.max(streak);
    state.last_click = now;
    state.total_clicks += 1;
    state.days_active.insert(day_key(now));

    // Payout: click value scaled by prestige and active bonuses,
    // doubled on a critical roll, floored to whole pNTR.
    let bonus = state.bonus_multiplier(now);
    let mut gain = state.click_value as f64 * state.prestige.multipliers.currency * bonus;
    let critical = rng.chance(CRIT_CHANCE);
    if critical {
        gain *= CRIT_MULTIPLIER;
    }
    let amount = gain.floor() as u64;
    state.currency += amount;
    events.push(DomainEvent::CoinsEarned { amount, critical });

    if streak_changed {
        events.push(DomainEvent::StreakChanged { streak });
    }

    let xp = state.prestige.multipliers.experience.floor() as u64;
    progression::grant_experience(state, xp, rng, events);

    missions::bump(state, Trigger::Click, events);
    if streak >= 5 && streak % 5 == 0 {
        missions::bump(state, Trigger::StreakMilestone, events);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::SequenceRng;
    use crate::game::state::{ActiveBonus, BonusKind, PlayerId};

    fn fresh(now: Timestamp) -> PlayerState {
        PlayerState::new(PlayerId::new([1; 16]), now)
    }

    #[test]
    fn test_n_clicks_pay_n_times_click_value() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        state.click_value = 3;
        let mut rng = SequenceRng::constant(0.99); // never critical
        let mut events = Vec::new();

        // Spaced to stay under the rate limit.
        for i in 0..20 {
            handle_click(&mut state, start + i * 150, &mut rng, &mut events).unwrap();
        }

        assert_eq!(state.currency, 20 * 3);
        assert_eq!(state.total_clicks, 20);
    }

    #[test]
    fn test_critical_doubles_payout() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        state.click_value = 5;
        // First roll is the crit roll.
        let mut rng = SequenceRng::new(vec![0.05], 0.99);
        let mut events = Vec::new();

        handle_click(&mut state, start, &mut rng, &mut events).unwrap();

        assert_eq!(state.currency, 10);
        assert!(matches!(events[0], DomainEvent::CoinsEarned { amount: 10, critical: true }));
    }

    #[test]
    fn test_streak_extends_and_resets() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        handle_click(&mut state, start, &mut rng, &mut events).unwrap();
        handle_click(&mut state, start + 500, &mut rng, &mut events).unwrap();
        handle_click(&mut state, start + 1_000, &mut rng, &mut events).unwrap();
        assert_eq!(state.streak, 3);
        assert_eq!(state.max_streak, 3);

        // A gap past the window restarts the streak.
        handle_click(&mut state, start + 5_000, &mut rng, &mut events).unwrap();
        assert_eq!(state.streak, 1);
        assert_eq!(state.max_streak, 3);
    }

    #[test]
    fn test_bonus_and_prestige_multipliers_stack() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        state.click_value = 10;
        state.prestige.multipliers.currency = 1.1;
        state.active_bonuses.push(ActiveBonus {
            kind: BonusKind::Multiplier,
            value: 2.0,
            start_time: start,
            duration_ms: 60_000,
        });
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        handle_click(&mut state, start, &mut rng, &mut events).unwrap();

        // floor(10 * 1.1 * 2.0) = 22
        assert_eq!(state.currency, 22);
    }

    #[test]
    fn test_rate_limited_click_mutates_nothing_but_gate() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        for i in 0..10 {
            handle_click(&mut state, start + i * 10, &mut rng, &mut events).unwrap();
        }
        let before_currency = state.currency;
        let before_clicks = state.total_clicks;
        let before_energy = state.energy.current;

        let result = handle_click(&mut state, start + 200, &mut rng, &mut events);

        assert_eq!(result, Err(EngineError::RateLimited));
        assert_eq!(state.currency, before_currency);
        assert_eq!(state.total_clicks, before_clicks);
        assert_eq!(state.energy.current, before_energy);
        assert!(state.anti_abuse.suspicious);
    }

    #[test]
    fn test_click_without_energy_rejected() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        state.energy.current = 0;
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        let result = handle_click(&mut state, start, &mut rng, &mut events);

        assert!(matches!(result, Err(EngineError::InsufficientEnergy { .. })));
        assert_eq!(state.currency, 0);
        assert_eq!(state.total_clicks, 0);
    }

    #[test]
    fn test_click_records_active_day() {
        let start: Timestamp = 1_718_452_800_000; // 2024-06-15
        let mut state = fresh(start);
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        handle_click(&mut state, start, &mut rng, &mut events).unwrap();

        assert!(state.days_active.contains("2024-06-15"));
    }

    #[test]
    fn test_experience_scales_with_prestige() {
        let start: Timestamp = 1_718_452_800_000;
        let mut state = fresh(start);
        state.prestige.multipliers.experience = 2.5;
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        handle_click(&mut state, start, &mut rng, &mut events).unwrap();

        // floor(1 * 2.5) = 2
        assert_eq!(state.experience, 2);
    }
}
