//! Execute handlers for the Hyperion bridge contract.
//!
//! Handlers are organized by category:
//! - `admin` - Initialization, pause/unpause, ownership with expiry
//! - `valset` - Validator set rotation
//! - `batch` - Inbound batch settlement
//! - `outgoing` - Deposits towards Helios
//! - `factory` - Deployment of bridged cw20 tokens
//!
//! The guards below are shared by all handlers.
//!
//! # Re-entrancy
//!
//! Guarded handlers set [`REENTRANCY_GUARD`] before dispatching token
//! messages. The flag is cleared by the reply to the last outbound message
//! (or immediately when there is none), so a token that calls back into the
//! bridge while those messages run is rejected.

mod admin;
mod batch;
mod factory;
mod outgoing;
mod valset;

pub use admin::*;
pub use batch::*;
pub use factory::*;
pub use outgoing::*;
pub use valset::*;

use cosmwasm_std::{Addr, CosmosMsg, Env, StdResult, Storage, SubMsg, Uint256};

use crate::error::ContractError;
use crate::state::{
    Config, CONFIG, LAST_EVENT_NONCE, OWNERSHIP, PAUSED, REENTRANCY_GUARD, RELEASE_GUARD_REPLY_ID,
};

// ============================================================================
// Guards
// ============================================================================

pub fn ensure_initialized(storage: &dyn Storage) -> Result<Config, ContractError> {
    CONFIG
        .may_load(storage)?
        .ok_or(ContractError::NotInitialized)
}

pub fn ensure_not_paused(storage: &dyn Storage) -> Result<(), ContractError> {
    if PAUSED.may_load(storage)?.unwrap_or_default() {
        return Err(ContractError::Paused);
    }
    Ok(())
}

/// Caller is the current owner.
pub fn ensure_owner(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    let ownership = OWNERSHIP.load(storage)?;
    if ownership.owner.as_ref() != Some(sender) {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// Caller is the owner and the ownership window is still open.
pub fn ensure_owner_before_expiry(
    storage: &dyn Storage,
    env: &Env,
    sender: &Addr,
) -> Result<(), ContractError> {
    ensure_owner(storage, sender)?;
    if is_ownership_expired(storage, env)? {
        return Err(ContractError::OwnershipExpired);
    }
    Ok(())
}

pub fn is_ownership_expired(storage: &dyn Storage, env: &Env) -> StdResult<bool> {
    let ownership = OWNERSHIP.load(storage)?;
    Ok(env.block.time > ownership.expiry)
}

// ============================================================================
// Re-entrancy Guard
// ============================================================================

pub fn acquire_guard(storage: &mut dyn Storage) -> Result<(), ContractError> {
    if REENTRANCY_GUARD.may_load(storage)?.unwrap_or_default() {
        return Err(ContractError::ReentrantCall);
    }
    REENTRANCY_GUARD.save(storage, &true)?;
    Ok(())
}

pub fn release_guard(storage: &mut dyn Storage) -> StdResult<()> {
    REENTRANCY_GUARD.save(storage, &false)
}

/// Wrap the outbound messages of a guarded handler. The last one releases
/// the guard on success; with no messages the guard is released right away.
pub fn guarded(storage: &mut dyn Storage, msgs: Vec<CosmosMsg>) -> StdResult<Vec<SubMsg>> {
    let count = msgs.len();
    if count == 0 {
        release_guard(storage)?;
    }

    Ok(msgs
        .into_iter()
        .enumerate()
        .map(|(i, msg)| {
            if i + 1 == count {
                SubMsg::reply_on_success(msg, RELEASE_GUARD_REPLY_ID)
            } else {
                SubMsg::new(msg)
            }
        })
        .collect())
}

/// Advance and return the event nonce.
pub fn next_event_nonce(storage: &mut dyn Storage) -> Result<Uint256, ContractError> {
    let nonce = LAST_EVENT_NONCE
        .may_load(storage)?
        .unwrap_or_default()
        .checked_add(Uint256::from(1u128))
        .map_err(|_| ContractError::Overflow)?;
    LAST_EVENT_NONCE.save(storage, &nonce)?;
    Ok(nonce)
}
