//! Lifecycle handlers.
//!
//! This module handles:
//! - One-shot initialization
//! - Emergency pause/unpause
//! - Ownership transfer and renunciation, including renunciation by anyone
//!   once the ownership window has expired
//!
//! The ownership window only limits the token factory. Pause, unpause and
//! ownership changes stay with the owner until it renounces.

use cosmwasm_std::{Addr, DepsMut, Env, Event, MessageInfo, Response, Uint128, Uint256};

use super::{ensure_owner, is_ownership_expired};
use crate::error::ContractError;
use crate::events;
use crate::hash::{bytes32_to_hex, make_checkpoint};
use crate::msg::InitializeMsg;
use crate::state::{
    Config, Ownership, CONFIG, LAST_EVENT_NONCE, LAST_VALSET_CHECKPOINT, LAST_VALSET_NONCE,
    OWNERSHIP, OWNERSHIP_EXPIRY_DURATION, PAUSED,
};
use crate::validator::{parse_eth_addresses, total_power, Valset};

// ============================================================================
// Initialize
// ============================================================================

/// Commit the genesis validator set and make the caller owner.
pub fn execute_initialize(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InitializeMsg,
) -> Result<Response, ContractError> {
    if CONFIG.may_load(deps.storage)?.is_some() {
        return Err(ContractError::AlreadyInitialized);
    }
    let hyperion_id: [u8; 32] = msg
        .hyperion_id
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidHyperionId)?;
    if msg.validators.len() != msg.powers.len() {
        return Err(ContractError::MalformedCurrentValset);
    }
    if total_power(&msg.powers)? < msg.power_threshold {
        return Err(ContractError::InsufficientValsetPower);
    }

    let valset = Valset {
        validators: parse_eth_addresses(&msg.validators)?,
        powers: msg.powers.clone(),
        valset_nonce: Uint256::zero(),
        reward_amount: Uint128::zero(),
        reward_token: None,
    };
    let checkpoint = make_checkpoint(&hyperion_id, &valset);
    let expiry = env.block.time.plus_seconds(OWNERSHIP_EXPIRY_DURATION);

    CONFIG.save(
        deps.storage,
        &Config {
            hyperion_id,
            power_threshold: msg.power_threshold,
        },
    )?;
    LAST_VALSET_CHECKPOINT.save(deps.storage, &checkpoint)?;
    LAST_VALSET_NONCE.save(deps.storage, &Uint256::zero())?;
    LAST_EVENT_NONCE.save(deps.storage, &Uint256::zero())?;
    OWNERSHIP.save(
        deps.storage,
        &Ownership {
            owner: Some(info.sender.clone()),
            expiry,
        },
    )?;

    Ok(Response::new()
        .add_event(events::ownership_transferred(None, Some(&info.sender)))
        .add_event(events::valset_updated(
            Uint256::zero(),
            Uint256::zero(),
            Uint128::zero(),
            None,
            &msg.validators,
            &msg.powers,
        ))
        .add_attribute("method", "initialize")
        .add_attribute("hyperion_id", bytes32_to_hex(&hyperion_id))
        .add_attribute("power_threshold", msg.power_threshold.to_string())
        .add_attribute("validators", msg.validators.len().to_string())
        .add_attribute("checkpoint", bytes32_to_hex(&checkpoint))
        .add_attribute("owner", info.sender)
        .add_attribute("ownership_expiry", expiry.seconds().to_string()))
}

// ============================================================================
// Pause/Unpause
// ============================================================================

/// Pause the bridge (stops deposits, batches and valset updates).
pub fn execute_emergency_pause(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    if PAUSED.may_load(deps.storage)?.unwrap_or_default() {
        return Err(ContractError::Paused);
    }

    PAUSED.save(deps.storage, &true)?;

    Ok(Response::new()
        .add_event(events::paused(&info.sender))
        .add_attribute("method", "emergency_pause")
        .add_attribute("account", info.sender))
}

pub fn execute_emergency_unpause(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    if !PAUSED.may_load(deps.storage)?.unwrap_or_default() {
        return Err(ContractError::NotPaused);
    }

    PAUSED.save(deps.storage, &false)?;

    Ok(Response::new()
        .add_event(events::unpaused(&info.sender))
        .add_attribute("method", "emergency_unpause")
        .add_attribute("account", info.sender))
}

// ============================================================================
// Ownership
// ============================================================================

/// Hand ownership to `new_owner`. The expiry timestamp is not extended.
pub fn execute_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;
    if new_owner.is_empty() {
        return Err(ContractError::ZeroOwner);
    }
    let new_owner = deps.api.addr_validate(&new_owner)?;

    let event = set_owner(deps, Some(new_owner.clone()))?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "transfer_ownership")
        .add_attribute("new_owner", new_owner))
}

pub fn execute_renounce_ownership(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_owner(deps.storage, &info.sender)?;

    let event = set_owner(deps, None)?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "renounce_ownership"))
}

/// Anyone may drop the owner once the ownership window has passed.
pub fn execute_renounce_ownership_after_expiry(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    if !is_ownership_expired(deps.storage, &env)? {
        return Err(ContractError::OwnershipNotExpired);
    }

    let event = set_owner(deps, None)?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "renounce_ownership_after_expiry")
        .add_attribute("caller", info.sender))
}

fn set_owner(deps: DepsMut, new_owner: Option<Addr>) -> Result<Event, ContractError> {
    let mut ownership = OWNERSHIP.load(deps.storage)?;
    let previous = ownership.owner.take();
    ownership.owner = new_owner;
    OWNERSHIP.save(deps.storage, &ownership)?;

    Ok(events::ownership_transferred(
        previous.as_ref(),
        ownership.owner.as_ref(),
    ))
}
