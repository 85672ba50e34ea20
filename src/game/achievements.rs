//! Achievements, Seasonal Events, and Titles
//!
//! One centralized evaluator runs after every successful command. Each
//! achievement is a pure predicate over the player state; the unlocked
//! set is monotonic. Titles derive from achievements and prestige and
//! are recomputed on demand, never stored.

use crate::core::clock::{day_key, Timestamp};
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::missions::{self, Trigger};
use crate::game::state::PlayerState;

/// A calendar-windowed seasonal event. Both bounds are inclusive.
pub struct SeasonalEvent {
    pub id: &'static str,
    pub start_day: &'static str,
    pub end_day: &'static str,
}

/// The seasonal calendar. Day keys are ISO dates, so the window test is
/// a plain lexicographic comparison.
pub const SEASONAL_EVENTS: [SeasonalEvent; 2] = [
    SeasonalEvent { id: "natal2024", start_day: "2024-12-20", end_day: "2024-12-27" },
    SeasonalEvent { id: "carnaval2025", start_day: "2025-02-25", end_day: "2025-03-05" },
];

/// Ids of the seasonal events whose window contains `now`.
pub fn active_events(now: Timestamp) -> Vec<&'static str> {
    let today = day_key(now);
    SEASONAL_EVENTS
        .iter()
        .filter(|event| event.start_day <= today.as_str() && today.as_str() <= event.end_day)
        .map(|event| event.id)
        .collect()
}

fn event_active(id: &str, now: Timestamp) -> bool {
    active_events(now).contains(&id)
}

struct AchievementSpec {
    id: &'static str,
    predicate: fn(&PlayerState, Timestamp) -> bool,
}

const ACHIEVEMENTS: [AchievementSpec; 15] = [
    AchievementSpec { id: "streak5", predicate: |s, _| s.max_streak >= 5 },
    AchievementSpec { id: "streak10", predicate: |s, _| s.max_streak >= 10 },
    AchievementSpec { id: "streak25", predicate: |s, _| s.max_streak >= 25 },
    AchievementSpec { id: "coins100", predicate: |s, _| s.currency >= 100 },
    AchievementSpec { id: "coins1000", predicate: |s, _| s.currency >= 1_000 },
    AchievementSpec { id: "coins5000", predicate: |s, _| s.currency >= 5_000 },
    AchievementSpec { id: "upgrade1", predicate: |s, _| s.upgrades.click.level > 1 },
    AchievementSpec { id: "upgrade5", predicate: |s, _| s.upgrades.click.level >= 5 },
    AchievementSpec { id: "level5", predicate: |s, _| s.level >= 5 },
    AchievementSpec { id: "level10", predicate: |s, _| s.level >= 10 },
    AchievementSpec { id: "referral1", predicate: |s, _| !s.referral.inbound.is_empty() },
    AchievementSpec { id: "airdrop100", predicate: |s, _| s.airdrop_points() >= 100 },
    AchievementSpec { id: "day7", predicate: |s, _| s.days_active.len() >= 7 },
    AchievementSpec { id: "conquista_natal", predicate: |_, now| event_active("natal2024", now) },
    AchievementSpec { id: "conquista_carnaval", predicate: |_, now| event_active("carnaval2025", now) },
];

/// Evaluate every predicate and unlock the newly true ones.
///
/// Each unlock emits an event and advances the badge mission. Unlocked
/// entries are never removed, so a predicate later turning false (for
/// example currency spent below a threshold) has no effect.
pub fn evaluate(state: &mut PlayerState, now: Timestamp, events: &mut Vec<DomainEvent>) {
    let unlocked: Vec<&'static str> = ACHIEVEMENTS
        .iter()
        .filter(|spec| !state.achievements.contains(spec.id) && (spec.predicate)(state, now))
        .map(|spec| spec.id)
        .collect();

    for id in unlocked {
        state.achievements.insert(id.to_string());
        events.push(DomainEvent::AchievementUnlocked { id: id.to_string() });
        missions::bump(state, Trigger::Badge, events);
    }
}

/// A cosmetic title and the condition that unlocks it.
pub struct TitleSpec {
    pub id: &'static str,
    pub unlock: fn(&PlayerState) -> bool,
}

/// All titles. `starter` is always available.
pub const TITLES: [TitleSpec; 4] = [
    TitleSpec { id: "starter", unlock: |_| true },
    TitleSpec { id: "streaker", unlock: |s| s.achievements.contains("streak10") },
    TitleSpec { id: "veteran", unlock: |s| s.achievements.contains("day7") },
    TitleSpec { id: "ascendant", unlock: |s| s.prestige.level >= 1 },
];

/// Ids of the titles currently unlocked for this player.
pub fn unlocked_titles(state: &PlayerState) -> Vec<&'static str> {
    TITLES
        .iter()
        .filter(|spec| (spec.unlock)(state))
        .map(|spec| spec.id)
        .collect()
}

/// Process an equip-title command.
pub fn handle_equip_title(
    state: &mut PlayerState,
    id: &str,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    let spec = TITLES
        .iter()
        .find(|spec| spec.id == id)
        .ok_or_else(|| EngineError::UnknownTitle(id.to_string()))?;
    if !(spec.unlock)(state) {
        return Err(EngineError::TitleLocked(id.to_string()));
    }
    state.equipped_title = id.to_string();
    events.push(DomainEvent::TitleEquipped { id: id.to_string() });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::PlayerId;

    const NOON: Timestamp = 1_718_452_800_000; // 2024-06-15T12:00Z

    fn fresh() -> PlayerState {
        PlayerState::new(PlayerId::new([1; 16]), NOON)
    }

    #[test]
    fn test_wealth_achievements_unlock_at_thresholds() {
        let mut state = fresh();
        let mut events = Vec::new();

        state.currency = 99;
        evaluate(&mut state, NOON, &mut events);
        assert!(!state.achievements.contains("coins100"));

        state.currency = 1_000;
        evaluate(&mut state, NOON, &mut events);
        assert!(state.achievements.contains("coins100"));
        assert!(state.achievements.contains("coins1000"));
        assert!(!state.achievements.contains("coins5000"));
    }

    #[test]
    fn test_unlocks_are_monotonic() {
        let mut state = fresh();
        let mut events = Vec::new();

        state.currency = 150;
        evaluate(&mut state, NOON, &mut events);
        assert!(state.achievements.contains("coins100"));

        // Spending below the threshold does not revoke the unlock.
        state.currency = 0;
        evaluate(&mut state, NOON, &mut events);
        assert!(state.achievements.contains("coins100"));
    }

    #[test]
    fn test_each_unlock_emitted_once() {
        let mut state = fresh();
        let mut events = Vec::new();

        state.max_streak = 12;
        evaluate(&mut state, NOON, &mut events);
        evaluate(&mut state, NOON, &mut events);

        let unlocks: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, DomainEvent::AchievementUnlocked { .. }))
            .collect();
        assert_eq!(unlocks.len(), 2); // streak5 and streak10, once each
    }

    #[test]
    fn test_unlock_bumps_badge_mission() {
        let mut state = fresh();
        let mut events = Vec::new();

        state.max_streak = 5;
        evaluate(&mut state, NOON, &mut events);

        let badge = state.missions.daily.iter().find(|m| m.id == "badge1").unwrap();
        assert_eq!(badge.progress, 1);
        assert!(badge.completed);
    }

    #[test]
    fn test_seasonal_window_is_inclusive() {
        // 2024-12-20T12:00Z and 2024-12-27T12:00Z
        let start: Timestamp = 1_734_696_000_000;
        let end: Timestamp = 1_735_300_800_000;

        assert_eq!(active_events(start), vec!["natal2024"]);
        assert_eq!(active_events(end), vec!["natal2024"]);
        assert!(active_events(NOON).is_empty());
    }

    #[test]
    fn test_seasonal_achievement_during_window() {
        let mut state = fresh();
        let mut events = Vec::new();
        let christmas: Timestamp = 1_734_696_000_000;

        evaluate(&mut state, christmas, &mut events);
        assert!(state.achievements.contains("conquista_natal"));
        assert!(!state.achievements.contains("conquista_carnaval"));
    }

    #[test]
    fn test_titles_unlock_from_achievements() {
        let mut state = fresh();
        assert_eq!(unlocked_titles(&state), vec!["starter"]);

        state.achievements.insert("streak10".to_string());
        state.prestige.level = 1;
        assert_eq!(unlocked_titles(&state), vec!["starter", "streaker", "ascendant"]);
    }

    #[test]
    fn test_equip_title_validation() {
        let mut state = fresh();
        let mut events = Vec::new();

        assert_eq!(
            handle_equip_title(&mut state, "nope", &mut events),
            Err(EngineError::UnknownTitle("nope".into()))
        );
        assert_eq!(
            handle_equip_title(&mut state, "veteran", &mut events),
            Err(EngineError::TitleLocked("veteran".into()))
        );

        state.achievements.insert("day7".to_string());
        handle_equip_title(&mut state, "veteran", &mut events).unwrap();
        assert_eq!(state.equipped_title, "veteran");
        assert_eq!(events, vec![DomainEvent::TitleEquipped { id: "veteran".into() }]);
    }
}
