//! Referral Graph
//!
//! Each player owns an immutable 8-character code and may redeem
//! someone else's code exactly once. The cross-player edge lives in the
//! referral ledger; the redeemer's side is recorded locally only after
//! the ledger write commits, so a crash between the two leaves at worst
//! a dangling inbound entry and never a phantom redemption.

use crate::game::error::EngineError;
use crate::game::events::DomainEvent;
use crate::game::missions::{self, Trigger};
use crate::game::state::PlayerState;
use crate::ports::{LedgerConflict, ReferrerLookup};

/// Referral codes are exactly this many characters.
pub const REFERRAL_CODE_LEN: usize = 8;

/// Ledger append attempts before giving up on contention.
const APPEND_RETRIES: u32 = 3;

/// Generate a fresh referral code from a random UUID.
pub fn generate_referral_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..REFERRAL_CODE_LEN].to_uppercase()
}

/// Process a redeem command.
pub fn handle_redeem(
    state: &mut PlayerState,
    code: &str,
    ledger: &dyn ReferrerLookup,
    events: &mut Vec<DomainEvent>,
) -> Result<(), EngineError> {
    if code.len() != REFERRAL_CODE_LEN {
        return Err(EngineError::InvalidCodeLength(code.len()));
    }
    if code == state.referral.own_code {
        return Err(EngineError::SelfReferral);
    }
    if state.referral.redeemed_code.is_some() {
        return Err(EngineError::AlreadyReferred);
    }
    let owner = ledger.resolve(code).ok_or(EngineError::UnknownCode)?;
    if owner == state.id {
        return Err(EngineError::SelfReferral);
    }

    // The ledger write commits first. Duplicate appends are no-ops, so
    // retrying after contention cannot double-count.
    let mut attempts = 0;
    loop {
        match ledger.append_inbound(owner, state.id) {
            Ok(()) => break,
            Err(LedgerConflict::Contention) => {
                attempts += 1;
                if attempts >= APPEND_RETRIES {
                    return Err(EngineError::ReferralConflict);
                }
            }
        }
    }

    state.referral.redeemed_code = Some(code.to_string());
    events.push(DomainEvent::ReferralAdded { code: code.to_string() });
    missions::bump(state, Trigger::Referral, events);
    Ok(())
}

/// Mirror the ledger's inbound set into local state.
///
/// Runs during housekeeping so achievements over the inbound set see
/// redemptions made by other players since the last command.
pub fn refresh_inbound(state: &mut PlayerState, ledger: &dyn ReferrerLookup) {
    state.referral.inbound = ledger.inbound(state.id);
}
