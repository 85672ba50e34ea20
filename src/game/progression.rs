//! Progression Model
//!
//! Experience curve, leveling, and stat growth. Leftover experience past
//! the threshold is discarded on level-up, not carried over — this
//! mirrors the reference behavior and is intentionally preserved.

use crate::core::rng::EngineRng;
use crate::game::events::DomainEvent;
use crate::game::state::{PlayerState, MAX_LEVEL};

/// Experience required to leave the given level: `floor(100 * level^1.7)`.
pub fn experience_to_next(level: u32) -> u64 {
    (100.0 * (level as f64).powf(1.7)).floor() as u64
}

/// Apply gained experience, leveling up as thresholds are crossed.
///
/// Each level-up grows every stat by 1 or 2, drawn uniformly from the
/// injected RNG, and emits a `LevelUp` event.
pub fn grant_experience(
    state: &mut PlayerState,
    gained: u64,
    rng: &mut dyn EngineRng,
    events: &mut Vec<DomainEvent>,
) {
    state.experience += gained;

    while state.experience >= state.experience_to_next && state.level < MAX_LEVEL {
        state.level += 1;
        // Remainder is discarded by design; see module docs.
        state.experience = 0;
        state.experience_to_next = experience_to_next(state.level);

        state.stats.strength += 1 + rng.roll(2);
        state.stats.agility += 1 + rng.roll(2);
        state.stats.defense += 1 + rng.roll(2);
        state.stats.charisma += 1 + rng.roll(2);

        events.push(DomainEvent::LevelUp { level: state.level, stats: state.stats });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::SequenceRng;
    use crate::game::state::PlayerId;

    fn fresh() -> PlayerState {
        PlayerState::new(PlayerId::new([1; 16]), 1_000)
    }

    #[test]
    fn test_curve_values() {
        assert_eq!(experience_to_next(1), 100);
        assert_eq!(experience_to_next(2), (100.0 * 2f64.powf(1.7)).floor() as u64);
        assert!(experience_to_next(9) > experience_to_next(8));
    }

    #[test]
    fn test_level_up_discards_remainder() {
        let mut state = fresh();
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        // 100 to next; grant 150 and the extra 50 is thrown away.
        grant_experience(&mut state, 150, &mut rng, &mut events);

        assert_eq!(state.level, 2);
        assert_eq!(state.experience, 0);
        assert_eq!(state.experience_to_next, experience_to_next(2));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_stat_growth_range() {
        let mut state = fresh();
        let before = state.stats;
        // roll(2) maps [0, 0.5) -> 0 and [0.5, 1) -> 1, so growth is 1 or 2.
        let mut rng = SequenceRng::new(vec![0.0, 0.99, 0.5, 0.49], 0.0);
        let mut events = Vec::new();

        grant_experience(&mut state, 100, &mut rng, &mut events);

        assert_eq!(state.stats.strength, before.strength + 1);
        assert_eq!(state.stats.agility, before.agility + 2);
        assert_eq!(state.stats.defense, before.defense + 2);
        assert_eq!(state.stats.charisma, before.charisma + 1);
    }

    #[test]
    fn test_level_cap() {
        let mut state = fresh();
        state.level = MAX_LEVEL;
        state.experience_to_next = experience_to_next(MAX_LEVEL);
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        grant_experience(&mut state, 1_000_000, &mut rng, &mut events);

        assert_eq!(state.level, MAX_LEVEL);
        assert!(events.is_empty());
        // Experience accumulates but can never level past the cap.
        assert_eq!(state.experience, 1_000_000);
    }

    #[test]
    fn test_no_level_below_threshold() {
        let mut state = fresh();
        let mut rng = SequenceRng::constant(0.99);
        let mut events = Vec::new();

        grant_experience(&mut state, 99, &mut rng, &mut events);

        assert_eq!(state.level, 1);
        assert_eq!(state.experience, 99);
        assert!(events.is_empty());
    }
}
