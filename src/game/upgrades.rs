//! Upgrade Shop
//!
//! Three purchasable tracks: click value, auto-clicker, and temporary
//! multiplier. Click and auto-clicker costs are discounted by the
//! square root of the prestige upgrade multiplier; the multiplier
//! upgrade is sold at face value.

use crate::core::clock::Timestamp;
use crate::game::command::UpgradeKind;
use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::state::{ActiveBonus, BonusKind, PlayerState};

fn charge(state: &mut PlayerState, cost: u64) -> Result<(), EngineError> {
    if state.currency < cost {
        return Err(EngineError::InsufficientFunds {
            needed: cost,
            available: state.currency,
        });
    }
    state.currency -= cost;
    Ok(())
}

/// Discounted price for the click and auto-clicker tracks.
fn discounted(cost: u64, upgrade_multiplier: f64) -> u64 {
    (cost as f64 / upgrade_multiplier.sqrt()).floor() as u64
}

/// Snapshots are loaded leniently, so a persisted multiplier below the
/// face value of 1.0 (or NaN) is treated as 1.0.
fn upgrade_multiplier(state: &PlayerState) -> f64 {
    state.prestige.multipliers.upgrade_discount.max(1.0)
}

/// Process a purchase command for the given track.
pub fn handle_purchase(
    state: &mut PlayerState,
    kind: UpgradeKind,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    match kind {
        UpgradeKind::ClickUpgrade => buy_click_upgrade(state, events),
        UpgradeKind::AutoClicker => buy_auto_clicker(state, now, events),
        UpgradeKind::Multiplier => buy_multiplier(state, now, events),
    }
}

fn buy_click_upgrade(state: &mut PlayerState, events: &mut Vec<DomainEvent>) -> Result<(), EngineError> {
    let upgrade_multiplier = upgrade_multiplier(state);
    let price = discounted(state.upgrades.click.cost, upgrade_multiplier);
    charge(state, price)?;

    let increment = upgrade_multiplier.floor() as u64;
    let new_level = state.upgrades.click.level + 1;
    state.upgrades.click.level = new_level;
    // Next price grows from the discounted price actually paid.
    state.upgrades.click.cost = (price as f64 * (1.9 + new_level as f64 * 0.08)).floor() as u64;
    state.upgrades.click.value += increment;
    state.click_value += increment;

    events.push(DomainEvent::UpgradePurchased {
        kind: UpgradeKind::ClickUpgrade,
        level: new_level,
        cost: price,
    });
    Ok(())
}

fn buy_auto_clicker(
    state: &mut PlayerState,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    let upgrade_multiplier = upgrade_multiplier(state);
    let price = discounted(state.upgrades.auto.cost, upgrade_multiplier);
    charge(state, price)?;

    let first_purchase = state.upgrades.auto.level == 0;
    let new_level = state.upgrades.auto.level + 1;
    state.upgrades.auto.level = new_level;
    state.upgrades.auto.cost = (price as f64 * (1.8 + new_level as f64 * 0.1)).floor() as u64;
    state.upgrades.auto.value += 0.1 * upgrade_multiplier;
    state.upgrades.auto.interval_ms = (state.upgrades.auto.interval_ms - 50).max(100);
    state.upgrades.auto.active = true;
    if first_purchase {
        // Accrual starts at purchase, not at account creation.
        state.upgrades.auto.last_tick = now;
    }

    events.push(DomainEvent::UpgradePurchased {
        kind: UpgradeKind::AutoClicker,
        level: new_level,
        cost: price,
    });
    Ok(())
}

fn buy_multiplier(
    state: &mut PlayerState,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    let price = state.upgrades.multiplier.cost;
    charge(state, price)?;

    let new_level = state.upgrades.multiplier.level + 1;
    state.upgrades.multiplier.level = new_level;
    state.upgrades.multiplier.cost = (price as f64 * (2.0 + new_level as f64 * 0.15)).floor() as u64;
    state.upgrades.multiplier.value += 0.5;

    // The bonus granted uses the value after the increase.
    let bonus = ActiveBonus {
        kind: BonusKind::Multiplier,
        value: state.upgrades.multiplier.value,
        start_time: now,
        duration_ms: state.upgrades.multiplier.duration_ms,
    };
    events.push(DomainEvent::BonusActivated {
        value: bonus.value,
        duration_ms: bonus.duration_ms,
    });
    state.active_bonuses.push(bonus);

    events.push(DomainEvent::UpgradePurchased {
        kind: UpgradeKind::Multiplier,
        level: new_level,
        cost: price,
    });
    Ok(())
}

/// Pause or resume a purchased auto-clicker.
pub fn handle_toggle_auto_clicker(
    state: &mut PlayerState,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    if state.upgrades.auto.level == 0 {
        return Err(EngineError::AutoClickerNotOwned);
    }
    state.upgrades.auto.active = !state.upgrades.auto.active;
    events.push(DomainEvent::AutoClickerToggled {
        active: state.upgrades.auto.active,
    });
    Ok(())
}

/// Accrue auto-clicker income lazily from elapsed whole intervals.
///
/// Called from engine housekeeping before every command. Passive income
/// is paid at face value; streak, critical, and multiplier bonuses do
/// not apply.
pub fn accrue_auto_clicker(
    state: &mut PlayerState,
    now: Timestamp,
    events: &mut Vec<DomainEvent>,
) {
    let auto = &mut state.upgrades.auto;
    if auto.level == 0 || !auto.active {
        return;
    }
    let elapsed = (now - auto.last_tick).max(0);
    // A corrupt snapshot can carry a zero interval; clamp before dividing.
    let interval_ms = auto.interval_ms.max(1);
    let ticks = (elapsed / interval_ms) as u64;
    if ticks == 0 {
        return;
    }
    let amount = (auto.value * ticks as f64).floor() as u64;
    state.currency += amount;
    // Keep the sub-interval remainder for the next accrual.
    auto.last_tick += ticks as i64 * interval_ms;
    events.push(DomainEvent::PassiveIncome { amount, ticks });
}
